//! Output records and composite identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Publication status of a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MangaStatus {
    #[default]
    Unknown,
    Ongoing,
    Completed,
    Hiatus,
    Cancelled,
}

/// One hit from the search endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// `<hash>-<slug>`, see [`MangaId`]
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub subtitle: String,
    /// Free text; the source gives no numeric guarantee
    pub rating: String,
    pub author: String,
    pub status: MangaStatus,
}

impl SearchResult {
    pub fn manga_id(&self) -> MangaId {
        MangaId::parse(&self.id)
    }
}

/// Metadata scraped from a title's detail page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MangaDetails {
    pub description: String,
    /// Insertion order, no duplicates
    pub genres: Vec<String>,
    pub status: MangaStatus,
    pub author: String,
    pub artist: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// `<manga id>/<source chapter id>-chapter-<number>`, see [`ChapterId`]
    pub id: String,
    pub title: String,
    pub chapter_number: f64,
    /// Epoch seconds, 0 when unknown
    pub upload_date: i64,
    pub scanlator: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub url: String,
    /// Reading order, contiguous from 0
    pub index: usize,
}

/// Title identifier: an opaque content hash plus a human slug.
///
/// The string form splits back at the first dash, so a hash must not contain
/// `-`; search results with such a hash are dropped. A bare value without a
/// dash stands for both parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MangaId {
    pub hash: String,
    pub slug: String,
}

impl MangaId {
    pub fn new(hash: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            slug: slug.into(),
        }
    }

    pub fn parse(id: &str) -> Self {
        let id = id.trim();
        match id.split_once('-') {
            Some((hash, slug)) => Self::new(hash, slug),
            None => Self::new(id, id),
        }
    }
}

impl fmt::Display for MangaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hash == self.slug {
            write!(f, "{}", self.hash)
        } else {
            write!(f, "{}-{}", self.hash, self.slug)
        }
    }
}

const CHAPTER_MARKER: &str = "-chapter-";

/// Chapter identifier, anchored to its title's [`MangaId`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ChapterId {
    pub manga: MangaId,
    pub chapter_id: String,
    pub number: String,
}

impl ChapterId {
    /// Everything before the first `/` is the manga id; a missing tail
    /// leaves `chapter_id` and `number` empty.
    pub fn parse(id: &str) -> Self {
        let (manga, rest) = id.trim().split_once('/').unwrap_or((id.trim(), ""));
        let (chapter_id, number) = rest.split_once(CHAPTER_MARKER).unwrap_or((rest, ""));

        Self {
            manga: MangaId::parse(manga),
            chapter_id: chapter_id.to_string(),
            number: number.to_string(),
        }
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}{}", self.manga, self.chapter_id, CHAPTER_MARKER, self.number)
    }
}
