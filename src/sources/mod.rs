//! Source trait, request descriptors and the fetch capability.
//!
//! A source turns host queries into requests, hands them to a [`Fetcher`]
//! and maps the returned HTML back into the content model.

pub mod allnovelbin;

pub use allnovelbin::AllNovelBin;

use crate::config::ScrapingConfig;
use crate::error::ScraperError;
use crate::model::{
    ChapterContent, ChapterRef, HomeSection, ListingTile, PageState, PagedTiles, SeriesSummary,
};
use async_trait::async_trait;
use log::debug;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::time::Duration;

/// Content rating advertised by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContentRating {
    Everyone,
    Mature,
    Adult,
}

/// Colour of a source badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TagType {
    Grey,
    Blue,
    Green,
    Yellow,
    Red,
}

/// Badge shown next to a source in the host's catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceTag {
    pub text: &'static str,
    pub tag_type: TagType,
}

/// Static metadata describing a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub author: &'static str,
    pub description: &'static str,
    pub content_rating: ContentRating,
    pub website_base_url: &'static str,
    pub language: &'static str,
    pub source_tags: &'static [SourceTag],
}

/// A request for the fetch capability to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub method: Method,
    /// Header name/value pairs, names in lowercase.
    pub headers: Vec<(&'static str, String)>,
}

impl Request {
    /// Creates a GET request with no extra headers.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            headers: Vec::new(),
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Looks up a header value by name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Executes requests and returns the raw response body.
///
/// Implementations own every transport concern; sources never retry.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<String, ScraperError>;
}

/// Fetcher backed by a shared `reqwest` client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher using the configured timeout.
    pub fn new(config: &ScrapingConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            client: create_http_client(config)?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<String, ScraperError> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self.client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound(request.url.clone()));
        }

        let response = response.error_for_status()?;
        let text = response.text().await?;

        debug!("{} -> {} bytes", request.url, text.len());
        Ok(text)
    }
}

/// Common HTTP client configuration for sources.
pub fn create_http_client(config: &ScrapingConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_sec))
        .build()
}

/// Trait implemented by every site adapter.
///
/// Ids are URLs: the series id returned by search or the home sections is
/// what `get_manga_details` and `get_chapters` take, and the chapter id from
/// `get_chapters` is what `get_chapter_details` takes.
#[async_trait]
pub trait Source: Send + Sync {
    /// Returns the static metadata for this source.
    fn info(&self) -> &'static SourceInfo;

    /// Checks if a URL belongs to this source's site.
    fn can_handle(&self, url: &str) -> bool;

    /// Fetches the detail page of a series.
    async fn get_manga_details(&self, manga_id: &str) -> Result<SeriesSummary, ScraperError>;

    /// Fetches the chapter list of a series, oldest chapter first.
    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<ChapterRef>, ScraperError>;

    /// Fetches the text of a single chapter.
    async fn get_chapter_details(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<ChapterContent, ScraperError>;

    /// Searches the site by title.
    async fn get_search_results(&self, query: Option<&str>)
    -> Result<Vec<ListingTile>, ScraperError>;

    /// Emits every home section empty, then again once its listing has loaded.
    ///
    /// Resolves after every section fetch has settled. The first failure is
    /// returned, but sections that loaded are still emitted.
    async fn get_home_sections(
        &self,
        emit: &(dyn Fn(HomeSection) + Send + Sync),
    ) -> Result<(), ScraperError>;

    /// Fetches one more page of a home section.
    async fn get_view_more_items(
        &self,
        section_id: &str,
        state: Option<PageState>,
    ) -> Result<PagedTiles, ScraperError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = Request::get("https://allnovelbin.net/x")
            .header("referer", "https://allnovelbin.net")
            .header("x-requested-with", "XMLHttpRequest");

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.header_value("Referer"), Some("https://allnovelbin.net"));
        assert_eq!(request.header_value("x-requested-with"), Some("XMLHttpRequest"));
        assert_eq!(request.header_value("user-agent"), None);
    }

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFetcher::new(&ScrapingConfig::default()).is_ok());
    }
}
