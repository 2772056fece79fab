//! NovelBin - AllNovelBin source adapter.
//!
//! This library provides:
//! - A [`Source`] implementation that scrapes allnovelbin.net into the
//!   reader's content model (series, chapters, listing tiles, home sections)
//! - A pluggable [`Fetcher`] so transport can be swapped out
//! - Configuration and console helpers for the `novelbin` CLI

pub mod config;
pub mod console;
pub mod dom;
pub mod error;
pub mod model;
pub mod sources;

// Re-export commonly used types
pub use config::Config;
pub use console::Console;
pub use error::{ConfigError, ScraperError};
pub use model::{
    ChapterContent, ChapterRef, HomeSection, ListingTile, MangaStatus, PageState, PagedTiles,
    SeriesSummary, Tag, TagSection,
};
pub use sources::{AllNovelBin, Fetcher, HttpFetcher, Request, Source, SourceInfo};
