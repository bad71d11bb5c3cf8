//! `<img>` tag extraction

use super::{has_image_extension, resolve_url, PageSource};
use crate::dom::attr_of;

/// Lazy-load attributes first; `src` often holds a placeholder when they exist
const SOURCE_ATTRS: &[&str] = &["data-src", "data-lazy-src", "data-original", "src"];

/// Raster image URLs from every `<img>` in the document, resolved against the base
pub fn extract_img_tags(source: &PageSource<'_>) -> Option<Vec<String>> {
    let urls: Vec<String> = source
        .document
        .elements_by_tag("img")
        .into_iter()
        .filter_map(|img| {
            SOURCE_ATTRS
                .iter()
                .find_map(|attr| attr_of(img, attr).map(str::trim).filter(|v| !v.is_empty()))
        })
        .filter_map(|src| resolve_url(source.base, src))
        .filter(has_image_extension)
        .map(String::from)
        .collect();

    (!urls.is_empty()).then_some(urls)
}
