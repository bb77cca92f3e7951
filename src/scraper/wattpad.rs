//! Wattpad adapter. API-backed: story metadata comes from the v3 stories
//! endpoint, chapter text from the storytext endpoint. Chapter titles are not
//! present on the text endpoint, so the part list from discovery is kept and
//! consulted when naming artifacts.

use crate::scraper::error::ScrapeError;
use crate::scraper::{parse_selector, write_artifact, FictionListing, HttpClient, SiteAdapter};
use regex::Regex;
use scraper::Html;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;

pub const ORIGIN: &str = "https://www.wattpad.com";

const API_STORYINFO: &str = "https://www.wattpad.com/api/v3/stories/";
const API_STORYTEXT: &str = "https://www.wattpad.com/apiv2/storytext?id=";

/// Story metadata shape from the v3 stories endpoint (fields we use).
#[derive(Debug, Deserialize)]
struct StoryInfo {
    title: String,
    parts: Vec<StoryPart>,
}

/// One chapter ("part") as reported by the API. `url` is fully qualified.
#[derive(Debug, Clone, Deserialize)]
struct StoryPart {
    url: String,
    title: String,
}

/// Wattpad scraper. Holds the part list from the last discovery so fetch can
/// name chapters.
#[derive(Debug, Default)]
pub struct WattpadAdapter {
    parts: Vec<StoryPart>,
}

impl WattpadAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Displayed title for a chapter URL, from the cached part list. Falls
    /// back to the URL's last path segment when discovery was skipped (e.g.
    /// resumed runs never call fetch without discover, but the fallback keeps
    /// the artifact writable either way).
    fn chapter_title(&self, chapter_url: &str) -> String {
        self.parts
            .iter()
            .find(|p| p.url == chapter_url)
            .map(|p| p.title.clone())
            .unwrap_or_else(|| {
                chapter_url
                    .rsplit('/')
                    .next()
                    .unwrap_or(chapter_url)
                    .to_string()
            })
    }
}

/// Extract the numeric story id from a fiction URL
/// (e.g. https://www.wattpad.com/story/12345-some-title).
fn story_id(fiction_url: &str) -> Result<String, ScrapeError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\.com/story/(\d+)").expect("static regex"));
    re.captures(fiction_url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ScrapeError::InvalidUrl {
            input: fiction_url.to_string(),
            reason: "expected a story URL like https://www.wattpad.com/story/<id>-<slug>"
                .to_string(),
        })
}

/// Extract the numeric part id from a chapter URL
/// (e.g. https://www.wattpad.com/834112711-title-chapter-1).
fn part_id(chapter_url: &str) -> Result<String, ScrapeError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\.com/(\d+)").expect("static regex"));
    re.captures(chapter_url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ScrapeError::InvalidUrl {
            input: chapter_url.to_string(),
            reason: "expected a part URL like https://www.wattpad.com/<id>-<slug>".to_string(),
        })
}

/// Parse the storyinfo JSON; part URLs become chapter references by stripping
/// the origin prefix.
fn parse_story_info(json: &str, url: &str) -> Result<(StoryInfo, Vec<String>), ScrapeError> {
    let info: StoryInfo = serde_json::from_str(json).map_err(|e| ScrapeError::Structure {
        url: url.to_string(),
        reason: format!("unexpected storyinfo shape: {}", e),
    })?;
    let refs = info
        .parts
        .iter()
        .map(|p| {
            p.url
                .strip_prefix(ORIGIN)
                .map(str::to_string)
                .unwrap_or_else(|| p.url.clone())
        })
        .collect();
    Ok((info, refs))
}

/// Paragraph texts from the storytext HTML fragment.
fn parse_story_text(html: &str, url: &str) -> Result<Vec<String>, ScrapeError> {
    let doc = Html::parse_document(html);
    let p_sel = parse_selector("p", url)?;
    Ok(doc
        .select(&p_sel)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .collect())
}

impl SiteAdapter for WattpadAdapter {
    fn discover(
        &mut self,
        client: &mut HttpClient,
        fiction_url: &str,
    ) -> Result<FictionListing, ScrapeError> {
        let id = story_id(fiction_url)?;
        let api_url = format!("{}{}", API_STORYINFO, id);
        let body = client.get_text(&api_url)?;
        let (info, chapter_refs) = parse_story_info(&body, &api_url)?;
        self.parts = info.parts;
        Ok(FictionListing {
            title: info.title,
            chapter_refs,
        })
    }

    fn fetch(
        &mut self,
        client: &mut HttpClient,
        chapter_url: &str,
        dest: &Path,
    ) -> Result<(), ScrapeError> {
        let id = part_id(chapter_url)?;
        let api_url = format!("{}{}", API_STORYTEXT, id);
        let body = client.get_text(&api_url)?;
        let paragraphs = parse_story_text(&body, &api_url)?;
        let title = self.chapter_title(chapter_url);
        write_artifact(dest, &title, &paragraphs)?;
        Ok(())
    }
}
