//! Page-image extraction
//!
//! Each module is one strategy for locating a chapter's image URLs in a
//! detail page:
//! - embedded `"images": [...]` data blobs
//! - `<img>` tags
//! - absolute image URLs inside inline scripts
//!
//! [`extract_pages`] runs them in that order and keeps the output of the
//! first one that finds anything. Results of different strategies are never
//! mixed.

mod embedded_extractor;
mod img_extractor;
mod script_extractor;

pub use embedded_extractor::*;
pub use img_extractor::*;
pub use script_extractor::*;

use std::collections::HashSet;
use tracing::debug;
use url::Url;

use crate::dom::Document;
use crate::models::Page;

/// Raster formats the reader can display
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp"];

/// Everything a strategy may look at
pub struct PageSource<'a> {
    /// Document text exactly as served
    pub raw: &'a str,
    pub document: &'a Document,
    /// Origin relative URLs resolve against
    pub base: &'a Url,
}

/// `None` or an empty list both mean the strategy missed.
pub type PageStrategy = fn(&PageSource<'_>) -> Option<Vec<String>>;

pub const PAGE_STRATEGIES: &[(&str, PageStrategy)] = &[
    ("embedded", extract_embedded_images as PageStrategy),
    ("img", extract_img_tags as PageStrategy),
    ("script", extract_script_images as PageStrategy),
];

/// Run the strategy chain and number the winning URLs in reading order.
pub fn extract_pages(source: &PageSource<'_>) -> Vec<Page> {
    for (name, strategy) in PAGE_STRATEGIES {
        let urls = dedup_urls(strategy(source).unwrap_or_default());
        if !urls.is_empty() {
            debug!("page strategy '{}' found {} images", name, urls.len());
            return urls
                .into_iter()
                .enumerate()
                .map(|(index, url)| Page { url, index })
                .collect();
        }
        debug!("page strategy '{}' found nothing", name);
    }

    Vec::new()
}

/// Drop exact repeats, keeping the first occurrence
pub fn dedup_urls(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Resolve `raw` against the base; only http(s) results are kept.
///
/// Handles protocol-relative (`//cdn/...`), absolute-path and
/// relative-path references.
pub fn resolve_url(base: &Url, raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }

    let url = base.join(raw).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Whether the URL path (query ignored) ends in a known image extension
pub fn has_image_extension(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str) -> Vec<Page> {
        let document = Document::parse(html);
        let base = Url::parse("https://comix.to").unwrap();
        extract_pages(&PageSource {
            raw: html,
            document: &document,
            base: &base,
        })
    }

    #[test]
    fn test_embedded_blob_wins_exclusively() {
        let html = r#"
        <html><body>
            <img src="/static/tag-1.jpg">
            <img data-src="https://cdn.comix.to/tag-2.png">
            <script>
                window.__DATA__ = {"chapter": {"images": [
                    {"url": "https://cdn.comix.to/p/1.webp"},
                    {"url": "https://cdn.comix.to/p/2.webp"}
                ]}};
            </script>
        </body></html>
        "#;

        let pages = run(html);
        let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["https://cdn.comix.to/p/1.webp", "https://cdn.comix.to/p/2.webp"]);
    }

    #[test]
    fn test_falls_back_to_img_tags() {
        let html = r#"
        <script>var data = {"images": [}</script>
        <img src="/a.jpg"><img src="/logo.svg"><img src="/b.png">
        "#;

        let pages = run(html);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].url, "https://comix.to/a.jpg");
        assert_eq!(pages[1].url, "https://comix.to/b.png");
    }

    #[test]
    fn test_falls_back_to_scripts() {
        let html = r#"
        <img src="/logo.svg">
        <script>load("https://cdn.comix.to/x/01.jpg"); load("https://cdn.comix.to/x/02.jpg");</script>
        "#;

        let pages = run(html);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].url, "https://cdn.comix.to/x/02.jpg");
    }

    #[test]
    fn test_indices_contiguous_after_dedup() {
        let html = r#"
        <img src="/1.jpg"><img src="/2.jpg"><img src="/1.jpg"><img src="/3.jpg"><img src="/2.jpg">
        "#;

        let pages = run(html);
        let indices: Vec<usize> = pages.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(pages[2].url, "https://comix.to/3.jpg");
    }

    #[test]
    fn test_no_pages_is_empty() {
        assert!(run("<html><body><p>Nothing here</p></body></html>").is_empty());
        assert!(run("").is_empty());
    }

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://comix.to").unwrap();

        assert_eq!(
            resolve_url(&base, "//cdn.comix.to/a.jpg").unwrap().as_str(),
            "https://cdn.comix.to/a.jpg"
        );
        assert_eq!(resolve_url(&base, "/a/b.jpg").unwrap().as_str(), "https://comix.to/a/b.jpg");
        assert_eq!(resolve_url(&base, "b.jpg").unwrap().as_str(), "https://comix.to/b.jpg");
        assert!(resolve_url(&base, "data:image/png;base64,AAAA").is_none());
        assert!(resolve_url(&base, "javascript:void(0)").is_none());
        assert!(resolve_url(&base, "  ").is_none());
    }

    #[test]
    fn test_image_extension_ignores_query() {
        let url = Url::parse("https://cdn.comix.to/a/B.JPEG?token=1.gif").unwrap();
        assert!(has_image_extension(&url));

        let url = Url::parse("https://cdn.comix.to/a.gif?x=.jpg").unwrap();
        assert!(!has_image_extension(&url));
    }
}
