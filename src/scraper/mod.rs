//! Site adapters and site resolution: origin registry, the adapter trait,
//! the shared client, and the shared chapter-artifact writer.

mod client;
mod error;

pub mod royalroad;
pub mod wattpad;

pub use client::{HttpClient, HttpClientBuilder};
pub use error::ScrapeError;

use crate::sanitize::sanitize_title;
use reqwest::Url;
use scraper::Selector;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Result of chapter discovery: the fiction's display title and its chapter
/// references (path components relative to the origin) in site-reported
/// order. The orchestrator never reorders them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FictionListing {
    pub title: String,
    pub chapter_refs: Vec<String>,
}

/// One site's scraping capability. Adapters are stateful for the duration of
/// one fiction: `discover` runs once, then `fetch` once per remaining chapter.
pub trait SiteAdapter {
    /// Fetch the fiction's landing resource and extract the ordered chapter
    /// list and title. Adapters surface a site-provided error message in
    /// `Structure` when they can find one; whether the error is swallowed is
    /// the caller's decision.
    fn discover(
        &mut self,
        client: &mut HttpClient,
        fiction_url: &str,
    ) -> Result<FictionListing, ScrapeError>;

    /// Fetch one chapter and write its artifact into `dest`. Creates or
    /// overwrites exactly one file.
    fn fetch(
        &mut self,
        client: &mut HttpClient,
        chapter_url: &str,
        dest: &Path,
    ) -> Result<(), ScrapeError>;
}

/// Scheme+host of a fiction URL, e.g. "https://www.royalroad.com".
pub fn origin_of(fiction_url: &str) -> Result<String, ScrapeError> {
    let url = Url::parse(fiction_url).map_err(|e| ScrapeError::InvalidUrl {
        input: fiction_url.to_string(),
        reason: e.to_string(),
    })?;
    let host = url.host_str().ok_or_else(|| ScrapeError::InvalidUrl {
        input: fiction_url.to_string(),
        reason: "URL has no host".to_string(),
    })?;
    Ok(format!("{}://{}", url.scheme(), host))
}

/// Exact-match lookup from origin to adapter: case-sensitive, no "www." or
/// trailing-slash normalization. Unknown origin fails with `UnsupportedSite`;
/// the caller skips that fiction and moves on.
pub fn resolve(origin: &str) -> Result<Box<dyn SiteAdapter>, ScrapeError> {
    match origin {
        royalroad::ORIGIN => Ok(Box::new(royalroad::RoyalRoadAdapter::new())),
        wattpad::ORIGIN => Ok(Box::new(wattpad::WattpadAdapter::new())),
        _ => Err(ScrapeError::UnsupportedSite {
            origin: origin.to_string(),
        }),
    }
}

/// Parse a CSS selector or return a structure error (avoids panics from
/// Selector::parse).
pub(crate) fn parse_selector(sel: &str, url: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(sel).map_err(|e| ScrapeError::Structure {
        url: url.to_string(),
        reason: format!("invalid selector {:?}: {}", sel, e),
    })
}

/// Write one chapter artifact: `{dest}/{sanitized title}.txt`, one line per
/// paragraph. Overwrites any previous artifact with the same name, so
/// re-fetching an unchanged chapter is byte-for-byte idempotent.
pub(crate) fn write_artifact(
    dest: &Path,
    chapter_title: &str,
    paragraphs: &[String],
) -> Result<PathBuf, ScrapeError> {
    let path = dest.join(format!("{}.txt", sanitize_title(chapter_title)));
    let write = |path: &Path| -> std::io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        for paragraph in paragraphs {
            writeln!(file, "{}", paragraph)?;
        }
        Ok(())
    };
    write(&path).map_err(|e| ScrapeError::Write {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_of_strips_path_and_keeps_scheme_host() -> Result<(), ScrapeError> {
        let origin = origin_of("https://www.royalroad.com/fiction/123/slug")?;
        assert_eq!(origin, "https://www.royalroad.com");
        Ok(())
    }

    #[test]
    fn origin_of_rejects_invalid_url() {
        let result = origin_of("not-a-url");
        assert!(matches!(result, Err(ScrapeError::InvalidUrl { .. })));
    }

    #[test]
    fn resolve_royalroad() {
        assert!(resolve("https://www.royalroad.com").is_ok());
    }

    #[test]
    fn resolve_wattpad() {
        assert!(resolve("https://www.wattpad.com").is_ok());
    }

    #[test]
    fn resolve_is_exact_match_only() {
        // No "www." normalization, no scheme substitution, no case folding.
        for origin in [
            "https://royalroad.com",
            "http://www.royalroad.com",
            "https://WWW.ROYALROAD.COM",
            "https://www.example-fiction-host.test",
        ] {
            match resolve(origin) {
                Err(ScrapeError::UnsupportedSite { origin: o }) => assert_eq!(o, origin),
                Err(e) => panic!("expected UnsupportedSite for {origin}, got {e}"),
                Ok(_) => panic!("expected UnsupportedSite for {origin}, got an adapter"),
            }
        }
    }

    #[test]
    fn write_artifact_one_line_per_paragraph() -> Result<(), ScrapeError> {
        let dir = std::env::temp_dir();
        let paragraphs = vec!["First.".to_string(), "Second.".to_string()];
        let path = write_artifact(&dir, "novelpull mod test: artifact", &paragraphs)?;
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "First.\nSecond.\n");
        // Same content rewritten is byte-identical.
        let path2 = write_artifact(&dir, "novelpull mod test: artifact", &paragraphs)?;
        assert_eq!(path, path2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
        std::fs::remove_file(&path).ok();
        Ok(())
    }

    #[test]
    fn write_artifact_sanitizes_filename() -> Result<(), ScrapeError> {
        let dir = std::env::temp_dir();
        let path = write_artifact(&dir, "novelpull: a/b chapter?", &["x".to_string()])?;
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name, "novelpull_ab_chapter.txt");
        std::fs::remove_file(&path).ok();
        Ok(())
    }

    #[test]
    fn write_artifact_missing_dir_is_write_error() {
        let dir = Path::new("/nonexistent_dir_novelpull_xyz");
        let result = write_artifact(dir, "ch", &["x".to_string()]);
        assert!(matches!(result, Err(ScrapeError::Write { .. })));
    }
}
