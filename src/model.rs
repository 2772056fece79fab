//! Content model handed back to the host reader.
//!
//! Every record is rebuilt from the page on each call. Ids are URLs and are fed
//! straight back into later calls (series id into the chapter list, chapter id
//! into the content fetch).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication status of a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MangaStatus {
    #[default]
    Ongoing,
    Completed,
}

impl MangaStatus {
    /// Infers the status from the text of a status field.
    ///
    /// Only "completed" (any case) is recognised; everything else is ongoing.
    pub fn from_label(text: &str) -> Self {
        if text.to_lowercase().contains("completed") {
            MangaStatus::Completed
        } else {
            MangaStatus::Ongoing
        }
    }
}

/// A single tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub label: String,
}

/// A named group of tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSection {
    pub id: String,
    pub label: String,
    pub tags: Vec<Tag>,
}

impl TagSection {
    /// Wraps genre names into the single `genres` group.
    ///
    /// Returns `None` when there is nothing to wrap.
    pub fn genres<I, S>(names: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<Tag> = names
            .into_iter()
            .map(|name| {
                let name: String = name.into();
                Tag {
                    id: name.clone(),
                    label: name,
                }
            })
            .collect();

        if tags.is_empty() {
            return None;
        }

        Some(Self {
            id: "genres".to_string(),
            label: "Genres".to_string(),
            tags,
        })
    }
}

/// Detail-page summary of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// Detail-page URL.
    pub id: String,
    pub title: String,
    /// Cover image URL.
    pub image: String,
    pub author: String,
    /// The site lists no artist, so this mirrors `author`.
    pub artist: String,
    pub description: String,
    pub status: MangaStatus,
    /// Zero or one tag group.
    pub tags: Vec<TagSection>,
    /// Always 0, the site exposes no rating.
    pub rating: f32,
}

/// One entry of a series' chapter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterRef {
    /// Chapter page URL.
    pub id: String,
    pub series_id: String,
    pub name: String,
    /// First run of digits in `name`, 0 when there is none.
    pub chapter_num: f64,
    pub lang_code: String,
    /// When the chapter list was fetched.
    pub time: DateTime<Utc>,
}

/// Text body of a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterContent {
    pub id: String,
    pub series_id: String,
    pub lang_code: String,
    /// Image pages; always empty for this text-only source.
    pub pages: Vec<String>,
    pub long_strip: bool,
    pub html: String,
}

/// Lightweight listing entry used by search and browse views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingTile {
    /// Detail-page URL.
    pub id: String,
    pub image: String,
    pub title: String,
    pub subtitle: String,
}

/// A titled group of tiles on the home screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeSection {
    pub id: String,
    pub title: String,
    pub view_more: bool,
    pub items: Vec<ListingTile>,
}

/// Pagination cursor threaded through "view more" calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub page: u32,
}

impl Default for PageState {
    fn default() -> Self {
        Self { page: 1 }
    }
}

impl PageState {
    /// The state for the page after this one.
    pub fn next(self) -> Self {
        Self {
            page: self.page.saturating_add(1),
        }
    }
}

/// One page of "view more" results together with the cursor for the next call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedTiles {
    pub tiles: Vec<ListingTile>,
    /// `None` when the section is unknown and there is nothing to continue.
    pub next: Option<PageState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_label() {
        assert_eq!(MangaStatus::from_label("Status: Completed"), MangaStatus::Completed);
        assert_eq!(MangaStatus::from_label("STATUS: COMPLETED"), MangaStatus::Completed);
        assert_eq!(MangaStatus::from_label("Status: Ongoing"), MangaStatus::Ongoing);
        assert_eq!(MangaStatus::from_label("Status: Hiatus"), MangaStatus::Ongoing);
        assert_eq!(MangaStatus::from_label(""), MangaStatus::Ongoing);
    }

    #[test]
    fn test_genre_section() {
        let section = TagSection::genres(["Action", "Fantasy"]).unwrap();
        assert_eq!(section.id, "genres");
        assert_eq!(section.label, "Genres");
        assert_eq!(section.tags.len(), 2);
        assert_eq!(section.tags[1].id, "Fantasy");
        assert_eq!(section.tags[1].label, "Fantasy");

        assert!(TagSection::genres(Vec::<String>::new()).is_none());
    }

    #[test]
    fn test_page_state() {
        let state = PageState::default();
        assert_eq!(state.page, 1);
        assert_eq!(state.next().page, 2);
        assert_eq!(PageState { page: u32::MAX }.next().page, u32::MAX);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&MangaStatus::Completed).unwrap();
        assert_eq!(json, "\"COMPLETED\"");
    }
}
