//! Royal Road adapter. Discovery parses the fiction page's chapter table;
//! each chapter page yields the paragraphs written to the artifact.
//!
//! Cloudflare: cookie jar and browser-like User-Agent are used; captcha is
//! not handled.

use crate::scraper::error::ScrapeError;
use crate::scraper::{
    parse_selector, write_artifact, FictionListing, HttpClient, SiteAdapter,
};
use scraper::Html;
use std::path::Path;

pub const ORIGIN: &str = "https://www.royalroad.com";

/// Royal Road scraper. Stateless between chapters; all context travels in the
/// chapter URL.
#[derive(Debug, Default)]
pub struct RoyalRoadAdapter;

impl RoyalRoadAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// Extract the ordered chapter hrefs and the fiction title from the fiction
/// page. A page without the expected structure is reported with the site's
/// own 404 panel text when present (deleted or hidden fictions).
fn parse_fiction_page(html: &str, url: &str) -> Result<FictionListing, ScrapeError> {
    let doc = Html::parse_document(html);

    let row_sel = parse_selector(".chapter-row", url)?;
    let link_sel = parse_selector("a", url)?;
    let title_sel = parse_selector("h1", url)?;

    let title = doc
        .select(&title_sel)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty());

    let title = match title {
        Some(t) => t,
        None => {
            return Err(ScrapeError::Structure {
                url: url.to_string(),
                reason: site_error_message(&doc, url)
                    .unwrap_or_else(|| "fiction title not found".to_string()),
            })
        }
    };

    let mut chapter_refs = Vec::new();
    for row in doc.select(&row_sel) {
        if let Some(href) = row
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            chapter_refs.push(href.to_string());
        }
    }

    Ok(FictionListing {
        title,
        chapter_refs,
    })
}

/// Best-effort read of the site's own error text from the 404 panel.
fn site_error_message(doc: &Html, url: &str) -> Option<String> {
    let panel_sel = parse_selector("div.col-md-12.page-404", url).ok()?;
    let p_sel = parse_selector("p", url).ok()?;
    let panel = doc.select(&panel_sel).next()?;
    let msg = panel
        .select(&p_sel)
        .next()
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())?;
    Some(msg)
}

/// Parse a chapter page into (displayed title, paragraph texts). The content
/// container and the h1 are both required structure.
fn parse_chapter_page(html: &str, url: &str) -> Result<(String, Vec<String>), ScrapeError> {
    let doc = Html::parse_document(html);

    let title_sel = parse_selector("h1", url)?;
    let title = doc
        .select(&title_sel)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ScrapeError::Structure {
            url: url.to_string(),
            reason: "chapter title not found".to_string(),
        })?;

    let container_sel = parse_selector("div.chapter-inner.chapter-content", url)?;
    let container = doc
        .select(&container_sel)
        .next()
        .ok_or_else(|| ScrapeError::Structure {
            url: url.to_string(),
            reason: "missing chapter content container".to_string(),
        })?;

    let p_sel = parse_selector("p", url)?;
    let paragraphs = container
        .select(&p_sel)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .collect();

    Ok((title, paragraphs))
}

impl SiteAdapter for RoyalRoadAdapter {
    fn discover(
        &mut self,
        client: &mut HttpClient,
        fiction_url: &str,
    ) -> Result<FictionListing, ScrapeError> {
        let html = client.get_text(fiction_url)?;
        parse_fiction_page(&html, fiction_url)
    }

    fn fetch(
        &mut self,
        client: &mut HttpClient,
        chapter_url: &str,
        dest: &Path,
    ) -> Result<(), ScrapeError> {
        let html = client.get_text(chapter_url)?;
        let (title, paragraphs) = parse_chapter_page(&html, chapter_url)?;
        write_artifact(dest, &title, &paragraphs)?;
        Ok(())
    }
}
