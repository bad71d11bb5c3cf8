//! Inline script URL scan, the last resort

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use super::{has_image_extension, PageSource};

/// A whole absolute URL token; the extension is checked on the parsed path
static URL_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s"'`<>()\\,;]+"#).unwrap());

/// Absolute image URLs mentioned in `<script>` bodies, in order of appearance
pub fn extract_script_images(source: &PageSource<'_>) -> Option<Vec<String>> {
    let mut urls = Vec::new();

    for script in source.document.elements_by_tag("script") {
        let body = script.text().collect::<String>().replace(r"\/", "/");

        urls.extend(
            URL_TOKEN_RE
                .find_iter(&body)
                .filter_map(|m| Url::parse(m.as_str()).ok())
                .filter(has_image_extension)
                .map(String::from),
        );
    }

    (!urls.is_empty()).then_some(urls)
}
