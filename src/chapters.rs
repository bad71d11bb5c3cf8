//! Paginated chapter listing: fetch every page, dedup, sort
//!
//! The aggregator does not know URLs; it is handed a page fetcher and walks
//! pages `1..=last_page` strictly in order. Page 1 must succeed, since it is
//! the only source of the page count. Later failures are logged and skipped
//! so one bad page costs its chapters, not the whole listing.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::api::{non_empty, ChapterRecord, Envelope};
use crate::error::Result;
use crate::models::{Chapter, ChapterId, MangaId};
use crate::normalize::parse_date;

static LEADING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)").unwrap());

/// Numeric `created_at` values above this are milliseconds
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

pub struct ChapterAggregator<'a> {
    /// Scanlator for chapters without a group
    pub source_name: &'a str,
    /// Cap on `last_page`, guarding against a bogus page count
    pub max_pages: u32,
}

impl<'a> ChapterAggregator<'a> {
    pub fn new(source_name: &'a str, max_pages: u32) -> Self {
        Self {
            source_name,
            max_pages: max_pages.max(1),
        }
    }

    /// Fetch all listing pages for `manga` and build its chapter list.
    ///
    /// Only a failure on page 1 is returned as an error.
    pub fn collect<F>(&self, manga: &MangaId, mut fetch_page: F) -> Result<Vec<Chapter>>
    where
        F: FnMut(u32) -> Result<Envelope<ChapterRecord>>,
    {
        let first = fetch_page(1)?;
        let last_page = self.last_page(&first, manga);
        let mut records = first.into_items();

        for page in 2..=last_page {
            match fetch_page(page) {
                Ok(envelope) => records.extend(envelope.into_items()),
                Err(e) => warn!(
                    "Skipping chapter page {}/{} of {}: {}",
                    page, last_page, manga, e
                ),
            }
        }

        debug!("Collected {} chapter records over {} pages for {}", records.len(), last_page, manga);
        Ok(self.merge(manga, records))
    }

    /// Dedup by chapter number (first occurrence wins) and sort descending.
    pub fn merge(&self, manga: &MangaId, records: Vec<ChapterRecord>) -> Vec<Chapter> {
        let mut seen = HashSet::new();
        let mut chapters = Vec::new();

        for record in records {
            let Some(raw_number) = non_empty(record.number.as_deref()) else {
                continue;
            };
            let number = parse_chapter_number(raw_number);
            let key = number_key(number);
            if !seen.insert(key.clone()) {
                continue;
            }

            chapters.push(self.to_chapter(manga, &record, number, key));
        }

        chapters.sort_by(|a, b| b.chapter_number.total_cmp(&a.chapter_number));
        chapters
    }

    fn last_page(&self, first: &Envelope<ChapterRecord>, manga: &MangaId) -> u32 {
        let reported = first.last_page().filter(|p| *p >= 1).unwrap_or(1);
        if reported > self.max_pages {
            warn!(
                "{} reports {} chapter pages, fetching only {}",
                manga, reported, self.max_pages
            );
            return self.max_pages;
        }
        reported
    }

    fn to_chapter(&self, manga: &MangaId, record: &ChapterRecord, number: f64, key: String) -> Chapter {
        let title = non_empty(record.name.as_deref())
            .map(String::from)
            .unwrap_or_else(|| format!("Chapter {}", key));

        let scanlator = record
            .scanlation_group
            .as_ref()
            .and_then(|g| non_empty(g.name.as_deref()))
            .unwrap_or(self.source_name)
            .to_string();

        let id = ChapterId {
            manga: manga.clone(),
            chapter_id: non_empty(record.chapter_id.as_deref()).unwrap_or_default().to_string(),
            number: key,
        };

        Chapter {
            id: id.to_string(),
            title,
            chapter_number: number,
            upload_date: upload_date(record.created_at.as_deref()),
            scanlator,
        }
    }
}

/// Leading decimal number of the text (`"10.5 (extra)"` -> 10.5), else 0
pub fn parse_chapter_number(text: &str) -> f64 {
    LEADING_NUMBER_RE
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Canonical string form used as the dedup key: `10`, `10.0` and `010` agree
fn number_key(number: f64) -> String {
    format!("{}", number)
}

fn upload_date(raw: Option<&str>) -> i64 {
    let Some(raw) = non_empty(raw) else {
        return 0;
    };

    if raw.bytes().all(|b| b.is_ascii_digit()) {
        return match raw.parse::<i64>() {
            Ok(ms) if ms > MILLIS_THRESHOLD => ms / 1000,
            Ok(secs) => secs,
            Err(_) => 0,
        };
    }

    parse_date(raw)
}
