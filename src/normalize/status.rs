//! Status text -> [`MangaStatus`]

use crate::models::MangaStatus;

/// Checked in order; the first keyword found anywhere in the text wins.
const STATUS_KEYWORDS: &[(&str, MangaStatus)] = &[
    ("ongoing", MangaStatus::Ongoing),
    ("publishing", MangaStatus::Ongoing),
    ("updating", MangaStatus::Ongoing),
    ("complete", MangaStatus::Completed),
    ("finished", MangaStatus::Completed),
    ("ended", MangaStatus::Completed),
    ("hiatus", MangaStatus::Hiatus),
    ("cancel", MangaStatus::Cancelled),
    ("discontinue", MangaStatus::Cancelled),
];

/// Map a free-text fragment such as `"Status: Currently Publishing"`.
pub fn parse_status(text: &str) -> MangaStatus {
    let lower = text.to_lowercase();

    STATUS_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, status)| *status)
        .unwrap_or_default()
}
