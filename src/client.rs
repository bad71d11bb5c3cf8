//! Catalog operations against the source
//!
//! [`CatalogClient`] builds endpoint URLs, fetches through its [`Transport`],
//! and hands bodies to the decoders and extractors. Each operation comes in
//! two forms: `try_*` returns the failure, the plain form logs it and
//! returns an empty value.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::api::{non_empty, Envelope, MangaRecord};
use crate::chapters::ChapterAggregator;
use crate::config::SourceConfig;
use crate::details::extract_details;
use crate::dom::Document;
use crate::error::{Result, SourceError};
use crate::extractors::{extract_pages, resolve_url, PageSource};
use crate::models::{Chapter, ChapterId, MangaDetails, MangaId, Page, SearchResult};
use crate::normalize::parse_status;
use crate::transport::{Transport, UreqTransport};

pub struct CatalogClient<T: Transport = UreqTransport> {
    config: SourceConfig,
    base: Url,
    headers: Vec<(String, String)>,
    transport: T,
}

impl CatalogClient<UreqTransport> {
    /// Client on the default blocking transport.
    pub fn from_config(config: SourceConfig) -> Result<Self> {
        let transport = UreqTransport::new(&config);
        Self::new(config, transport)
    }
}

impl<T: Transport> CatalogClient<T> {
    pub fn new(config: SourceConfig, transport: T) -> Result<Self> {
        let base = config.base()?;
        let headers = config.headers();

        Ok(Self {
            config,
            base,
            headers,
            transport,
        })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn search(&self, query: &str, page: u32) -> Vec<SearchResult> {
        or_default("search", self.try_search(query, page))
    }

    pub fn get_details(&self, id: &str) -> MangaDetails {
        or_default("details", self.try_get_details(id))
    }

    pub fn get_chapters(&self, id: &str) -> Vec<Chapter> {
        or_default("chapters", self.try_get_chapters(id))
    }

    pub fn get_pages(&self, chapter_id: &str) -> Vec<Page> {
        or_default("pages", self.try_get_pages(chapter_id))
    }

    /// One page of keyword search results, most relevant first. Page 0 is
    /// read as page 1.
    pub fn try_search(&self, query: &str, page: u32) -> Result<Vec<SearchResult>> {
        let mut url = self.endpoint(&["api", "v2", "manga"]);
        url.query_pairs_mut()
            .append_pair("order[relevance]", "desc")
            .append_pair("keyword", query)
            .append_pair("limit", &self.config.page_size.to_string())
            .append_pair("page", &page.max(1).to_string());

        let envelope: Envelope<MangaRecord> = self.fetch_json(&url)?;
        let results: Vec<SearchResult> = envelope
            .into_items()
            .into_iter()
            .filter_map(|record| self.to_search_result(record))
            .collect();

        debug!("search {:?} page {} -> {} results", query, page, results.len());
        Ok(results)
    }

    pub fn try_get_details(&self, id: &str) -> Result<MangaDetails> {
        let manga = parse_manga_id(id)?;
        let html = self.fetch_text(&self.title_url(&manga))?;
        Ok(extract_details(&Document::parse(&html)))
    }

    /// Every chapter of a title, deduplicated and sorted by number
    /// descending.
    pub fn try_get_chapters(&self, id: &str) -> Result<Vec<Chapter>> {
        let manga = parse_manga_id(id)?;
        let aggregator =
            ChapterAggregator::new(&self.config.source_name, self.config.max_chapter_pages);

        aggregator.collect(&manga, |page| self.fetch_json(&self.chapters_url(&manga, page)))
    }

    /// Image pages of a chapter, in reading order.
    pub fn try_get_pages(&self, chapter_id: &str) -> Result<Vec<Page>> {
        let chapter = ChapterId::parse(chapter_id);
        let manga = validate_manga_id(chapter.manga, chapter_id)?;

        let html = self.fetch_text(&self.title_url(&manga))?;
        let document = Document::parse(&html);
        let pages = extract_pages(&PageSource {
            raw: &html,
            document: &document,
            base: &self.base,
        });

        debug!("{} -> {} pages", chapter_id, pages.len());
        Ok(pages)
    }

    fn to_search_result(&self, record: MangaRecord) -> Option<SearchResult> {
        let Some(hash) = non_empty(record.hash_id.as_deref()) else {
            debug!("skipping search item without hash_id");
            return None;
        };
        // The id is split back at its first dash
        if hash.contains('-') {
            warn!("skipping search item with unsplittable hash_id {:?}", hash);
            return None;
        }
        let slug = non_empty(record.slug.as_deref()).unwrap_or(hash);

        let thumbnail_url = record
            .poster
            .as_ref()
            .and_then(|p| p.best())
            .map(|raw| {
                resolve_url(&self.base, raw)
                    .map(String::from)
                    .unwrap_or_else(|| raw.to_string())
            })
            .unwrap_or_default();

        let text = |value: &Option<String>| non_empty(value.as_deref()).unwrap_or_default().to_string();

        Some(SearchResult {
            id: MangaId::new(hash, slug).to_string(),
            title: text(&record.title),
            thumbnail_url,
            subtitle: text(&record.alt_title),
            rating: text(&record.rating),
            author: text(&record.author),
            status: parse_status(record.status.as_deref().unwrap_or_default()),
        })
    }

    /// `<base>/<segments...>`, keeping any path prefix of the base
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn title_url(&self, manga: &MangaId) -> Url {
        self.endpoint(&["title", manga.slug.as_str()])
    }

    fn chapters_url(&self, manga: &MangaId, page: u32) -> Url {
        let mut url = self.endpoint(&["api", "v2", "manga", manga.hash.as_str(), "chapters"]);
        url.query_pairs_mut()
            .append_pair("limit", &self.config.page_size.to_string())
            .append_pair("page", &page.to_string())
            .append_pair("order[number]", "desc");
        url
    }

    fn fetch_text(&self, url: &Url) -> Result<String> {
        let response = self.transport.fetch(url.as_str(), &self.headers)?;
        debug!("GET {} -> {} ({} bytes)", url, response.status, response.body.len());

        if !response.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }
        Ok(response.body)
    }

    fn fetch_json<D: DeserializeOwned>(&self, url: &Url) -> Result<D> {
        let body = self.fetch_text(url)?;
        serde_json::from_str(&body).map_err(|source| SourceError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

fn parse_manga_id(id: &str) -> Result<MangaId> {
    validate_manga_id(MangaId::parse(id), id)
}

fn validate_manga_id(manga: MangaId, raw: &str) -> Result<MangaId> {
    if manga.hash.is_empty() || manga.slug.is_empty() {
        return Err(SourceError::InvalidId(raw.to_string()));
    }
    Ok(manga)
}

fn or_default<V: Default>(operation: &str, result: Result<V>) -> V {
    result.unwrap_or_else(|e| {
        warn!("{} failed: {}", operation, e);
        V::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MangaStatus;
    use crate::transport::mock::{connection_refused, query, status, MockTransport};
    use crate::transport::HttpResponse;

    fn client(transport: MockTransport) -> CatalogClient<MockTransport> {
        CatalogClient::new(SourceConfig::default(), transport).unwrap()
    }

    fn chapter_page(numbers: &[u32], last_page: u32) -> String {
        let items: Vec<String> = numbers
            .iter()
            .map(|n| format!(r#"{{"chapter_id": {}, "number": {}}}"#, n * 100, n))
            .collect();
        format!(
            r#"{{"result": {{"items": [{}], "pagination": {{"last_page": {}}}}}}}"#,
            items.join(","),
            last_page
        )
    }

    const SEARCH_BODY: &str = r#"{
        "result": {
            "items": [
                {
                    "hash_id": "x7k2p",
                    "slug": "tower-of-god",
                    "title": "Tower of God",
                    "alt_title": "Sin-ui Tap",
                    "poster": {"large": "", "medium": "/posters/m.jpg"},
                    "rating": 8.9,
                    "author": "SIU",
                    "status": "Currently Publishing"
                },
                {"slug": "no-hash", "title": "Skipped"},
                {"hash_id": "ab-cd", "slug": "dashed", "title": "Skipped"},
                {"hash_id": "q1w2e"}
            ],
            "pagination": {"last_page": 1}
        }
    }"#;

    #[test]
    fn test_search() {
        let client = client(MockTransport::new(|url| {
            assert_eq!(url.path(), "/api/v2/manga");
            assert_eq!(query(url, "keyword").as_deref(), Some("tower god"));
            assert_eq!(query(url, "order[relevance]").as_deref(), Some("desc"));
            assert_eq!(query(url, "limit").as_deref(), Some("100"));
            assert_eq!(query(url, "page").as_deref(), Some("1"));
            Ok(HttpResponse::ok(SEARCH_BODY))
        }));

        let results = client.search("tower god", 0);
        assert_eq!(results.len(), 2);

        let first = &results[0];
        assert_eq!(first.id, "x7k2p-tower-of-god");
        assert_eq!(first.title, "Tower of God");
        assert_eq!(first.subtitle, "Sin-ui Tap");
        assert_eq!(first.thumbnail_url, "https://comix.to/posters/m.jpg");
        assert_eq!(first.rating, "8.9");
        assert_eq!(first.author, "SIU");
        assert_eq!(first.status, MangaStatus::Ongoing);
        assert_eq!(first.manga_id(), MangaId::new("x7k2p", "tower-of-god"));

        let bare = &results[1];
        assert_eq!(bare.id, "q1w2e");
        assert_eq!(bare.title, "");
        assert_eq!(bare.rating, "");
        assert_eq!(bare.thumbnail_url, "");
        assert_eq!(bare.status, MangaStatus::Unknown);
    }

    #[test]
    fn test_search_failures_are_empty() {
        let client = client(MockTransport::new(|_| status(503)));
        assert!(client.search("x", 1).is_empty());
        assert!(matches!(
            client.try_search("x", 1),
            Err(SourceError::Status { status: 503, .. })
        ));

        let client = client_with_body("<html>maintenance</html>");
        assert!(client.search("x", 1).is_empty());
        assert!(matches!(client.try_search("x", 1), Err(SourceError::Decode { .. })));

        let client = self::client(MockTransport::new(connection_refused));
        let err = client.try_search("x", 1).unwrap_err();
        assert!(err.is_transport());
    }

    fn client_with_body(body: &'static str) -> CatalogClient<MockTransport> {
        client(MockTransport::new(move |_| Ok(HttpResponse::ok(body))))
    }

    #[test]
    fn test_get_details() {
        let client = client(MockTransport::new(|url| {
            assert_eq!(url.path(), "/title/tower-of-god");
            Ok(HttpResponse::ok(
                r#"<html><head><meta name="description" content="Climb &amp; conquer"></head>
                <body>
                    <div><span>Author</span><a>SIU</a></div>
                    <div><span>Status</span><b>Completed</b></div>
                    <a href="/genre/action">Action</a>
                </body></html>"#,
            ))
        }));

        let details = client.get_details("x7k2p-tower-of-god");
        assert_eq!(details.description, "Climb & conquer");
        assert_eq!(details.genres, vec!["Action"]);
        assert_eq!(details.author, "SIU");
        assert_eq!(details.artist, "SIU");
        assert_eq!(details.status, MangaStatus::Completed);
    }

    #[test]
    fn test_get_details_failures() {
        let client = client(MockTransport::new(|_| status(404)));
        assert_eq!(client.get_details("x7k2p-tower"), MangaDetails::default());

        assert!(matches!(
            client.try_get_details("-tower"),
            Err(SourceError::InvalidId(_))
        ));
        assert!(matches!(client.try_get_details(""), Err(SourceError::InvalidId(_))));
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[test]
    fn test_get_chapters_walks_all_pages() {
        let client = client(MockTransport::new(|url| {
            assert_eq!(url.path(), "/api/v2/manga/x7k2p/chapters");
            assert_eq!(query(url, "order[number]").as_deref(), Some("desc"));
            match query(url, "page").as_deref() {
                Some("1") => Ok(HttpResponse::ok(chapter_page(&[5, 4], 3))),
                Some("2") => status(500),
                Some("3") => Ok(HttpResponse::ok(chapter_page(&[4, 1], 3))),
                other => panic!("unexpected page {:?}", other),
            }
        }));

        let chapters = client.get_chapters("x7k2p-tower");
        let numbers: Vec<f64> = chapters.iter().map(|c| c.chapter_number).collect();
        assert_eq!(numbers, vec![5.0, 4.0, 1.0]);
        assert_eq!(chapters[1].id, "x7k2p-tower/400-chapter-4");
        assert_eq!(chapters[1].title, "Chapter 4");
        assert_eq!(chapters[1].scanlator, "Comix");

        let pages: Vec<String> = client
            .transport()
            .requests()
            .iter()
            .filter_map(|u| Url::parse(u).ok())
            .filter_map(|u| query(&u, "page"))
            .collect();
        assert_eq!(pages, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_get_chapters_first_page_failure() {
        let client = client(MockTransport::new(connection_refused));
        assert!(client.get_chapters("x7k2p-tower").is_empty());
        assert!(client.try_get_chapters("x7k2p-tower").is_err());
    }

    #[test]
    fn test_get_pages_prefers_embedded_data() {
        let client = client(MockTransport::new(|url| {
            assert_eq!(url.path(), "/title/tower");
            Ok(HttpResponse::ok(
                r#"<html><body>
                <img src="/static/logo.png">
                <script>window.__DATA__ = {"images": ["https://cdn.example/c/1.jpg", {"url": "https://cdn.example/c/2.jpg"}]};</script>
                </body></html>"#,
            ))
        }));

        let pages = client.get_pages("x7k2p-tower/99812-chapter-10.5");
        assert_eq!(
            pages,
            vec![
                Page { url: "https://cdn.example/c/1.jpg".to_string(), index: 0 },
                Page { url: "https://cdn.example/c/2.jpg".to_string(), index: 1 },
            ]
        );
    }

    #[test]
    fn test_get_pages_from_lazy_images() {
        let client = client_with_body(
            r#"<div class="reader">
                <img data-src="/pages/1.webp" src="/loading.gif">
                <img data-src="//cdn.example/pages/2.JPG">
                <img data-src="/pages/1.webp">
            </div>"#,
        );

        let pages = client.get_pages("x7k2p-tower/1-chapter-1");
        let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["https://comix.to/pages/1.webp", "https://cdn.example/pages/2.JPG"]);
        assert_eq!(pages.iter().map(|p| p.index).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_get_pages_nothing_found() {
        let client = client_with_body("<html><body><p>No images</p></body></html>");
        assert!(client.get_pages("x7k2p-tower/1-chapter-1").is_empty());
        assert!(matches!(client.try_get_pages("/1-chapter-1"), Err(SourceError::InvalidId(_))));
    }

    #[test]
    fn test_base_path_prefix_is_kept() {
        let config = SourceConfig {
            base_url: "https://mirror.example/comix/".to_string(),
            ..Default::default()
        };
        let client = CatalogClient::new(
            config,
            MockTransport::new(|url| {
                assert_eq!(url.path(), "/comix/title/tower");
                Ok(HttpResponse::ok(""))
            }),
        )
        .unwrap();

        assert_eq!(client.get_details("x7k2p-tower"), MangaDetails::default());
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[test]
    fn test_bad_base_url() {
        let config = SourceConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(CatalogClient::from_config(config), Err(SourceError::Config(_))));
    }

    #[test]
    fn test_client_is_shareable() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<CatalogClient>();
        assert_send_sync::<CatalogClient<MockTransport>>();
    }
}
