//! AllNovelBin (allnovelbin.net) source implementation.
//!
//! English web novels. Detail, search and listing pages are plain HTML; the
//! chapter list comes from an AJAX fragment keyed by the numeric novel id.

use super::{
    ContentRating, Fetcher, HttpFetcher, Request, Source, SourceInfo, SourceTag, TagType,
};
use crate::config::ScrapingConfig;
use crate::dom;
use crate::error::ScraperError;
use crate::model::{
    ChapterContent, ChapterRef, HomeSection, ListingTile, MangaStatus, PageState, PagedTiles,
    SeriesSummary, TagSection,
};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use log::{debug, warn};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::{Arc, LazyLock};
use url::Url;

/// Site root.
pub const BASE_URL: &str = "https://allnovelbin.net";

/// Pinned mobile Safari user-agent sent on detail and search requests.
pub const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 15_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.0 Mobile/15E148 Safari/604.1";

/// Subtitle used when a listing row has no latest-chapter label.
const SITE_NAME: &str = "AllNovelBin";

/// Separator between chapter paragraphs.
pub const PARAGRAPH_SEPARATOR: &str = "<br><br>";

const LANG_CODE: &str = "en";

pub static INFO: SourceInfo = SourceInfo {
    name: SITE_NAME,
    version: "1.0.2",
    author: "Paperback",
    description: "Extension for AllNovelBin - English novels",
    content_rating: ContentRating::Mature,
    website_base_url: BASE_URL,
    language: LANG_CODE,
    source_tags: &[
        SourceTag {
            text: "Novels",
            tag_type: TagType::Grey,
        },
        SourceTag {
            text: "English",
            tag_type: TagType::Grey,
        },
    ],
};

/// Regex to extract the numeric novel id from a series URL.
static NOVEL_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"novelId=(\d+)").unwrap());

/// Regex for the chapter number inside a chapter name.
static CHAPTER_NUM_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// A home-screen listing.
#[derive(Debug, Clone, Copy)]
struct SectionDef {
    id: &'static str,
    title: &'static str,
    path: &'static str,
}

impl SectionDef {
    fn find(id: &str) -> Option<&'static SectionDef> {
        HOME_SECTIONS.iter().find(|def| def.id == id)
    }

    fn section(&self, items: Vec<ListingTile>) -> HomeSection {
        HomeSection {
            id: self.id.to_string(),
            title: self.title.to_string(),
            view_more: true,
            items,
        }
    }
}

static HOME_SECTIONS: [SectionDef; 4] = [
    SectionDef {
        id: "daily_updates",
        title: "Daily Updates",
        path: "/sort/daily-update-novels",
    },
    SectionDef {
        id: "hot_novels",
        title: "Hot Novels",
        path: "/sort/hot-all-novel-bin",
    },
    SectionDef {
        id: "completed_novels",
        title: "Completed Novels",
        path: "/sort/completed-all-novel-bin",
    },
    SectionDef {
        id: "popular_novels",
        title: "Most Popular",
        path: "/sort/popular-all-novel-bin",
    },
];

/// CSS selectors used for parsing.
struct Selectors {
    /// Series title on the detail page.
    title: Selector,
    /// Rows of the author/genre/status block.
    info_meta: Selector,
    /// Synopsis block.
    description: Selector,
    /// Cover on the detail page.
    cover: Selector,
    /// Chapter list item.
    chapter_item: Selector,
    /// Chapter link inside an item.
    chapter_link: Selector,
    /// Chapter name inside an item.
    chapter_name: Selector,
    /// Paragraphs of the chapter body.
    paragraph: Selector,
    /// Listing row (search, home and view-more pages).
    row: Selector,
    row_title: Selector,
    row_cover: Selector,
    row_link: Selector,
    row_latest: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            title: Selector::parse("h3.title").unwrap(),
            info_meta: Selector::parse("ul.info-meta > li").unwrap(),
            description: Selector::parse("div.desc-text").unwrap(),
            cover: Selector::parse("img.img-responsive").unwrap(),
            chapter_item: Selector::parse("li").unwrap(),
            chapter_link: Selector::parse("a").unwrap(),
            chapter_name: Selector::parse("span.nchr-text").unwrap(),
            paragraph: Selector::parse("div.chapter-content p").unwrap(),
            row: Selector::parse("div.list-novel > div.row").unwrap(),
            row_title: Selector::parse("h3.novel-title").unwrap(),
            row_cover: Selector::parse("img").unwrap(),
            row_link: Selector::parse("h3 > a").unwrap(),
            row_latest: Selector::parse("span.chr-text").unwrap(),
        }
    }
}

/// AllNovelBin source for allnovelbin.net.
pub struct AllNovelBin {
    fetcher: Arc<dyn Fetcher>,
    base_url: Url,
    user_agent: String,
    selectors: Selectors,
}

impl AllNovelBin {
    /// Creates a source that fetches over HTTP with the given configuration.
    pub fn new(config: &ScrapingConfig) -> Result<Self, ScraperError> {
        let fetcher = HttpFetcher::new(config)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Creates a source on top of an existing fetch capability.
    pub fn with_fetcher(
        config: &ScrapingConfig,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, ScraperError> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| ScraperError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        // Relative links join under the configured path, not its parent
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            fetcher,
            base_url,
            user_agent: config.user_agent.clone(),
            selectors: Selectors::new(),
        })
    }

    /// Site root without a trailing slash, as sent in `referer`.
    fn root(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Absolute URL for a path on the site.
    fn site_url(&self, path: &str) -> String {
        format!("{}{}", self.root(), path)
    }

    /// Listing URL of a home section, optionally for a given page.
    fn section_url(&self, def: &SectionDef, state: Option<PageState>) -> String {
        match state {
            Some(state) => format!("{}?page={}", self.site_url(def.path), state.page),
            None => self.site_url(def.path),
        }
    }

    /// Search URL with the query form-encoded into `keyword`.
    fn search_url(&self, query: &str) -> String {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("keyword", query)
            .finish();
        format!("{}?{}", self.site_url("/search"), encoded)
    }

    /// Extracts the numeric novel id from a series URL.
    fn extract_novel_id(url: &str) -> Result<&str, ScraperError> {
        NOVEL_ID_REGEX
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| ScraperError::InvalidUrl(format!("Novel ID not found: {}", url)))
    }

    /// Resolves a possibly relative link against the site root.
    ///
    /// Root-relative links that don't already carry the configured path are
    /// placed under it, so ids match the URLs requests are built from.
    fn resolve_url(&self, href: &str) -> String {
        if href.is_empty() || href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }

        if href.starts_with('/')
            && !href.starts_with("//")
            && !href.starts_with(self.base_url.path())
        {
            return self.site_url(href);
        }

        self.base_url
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string())
    }

    fn parse_series(&self, manga_id: &str, body: &str) -> SeriesSummary {
        let doc = Html::parse_document(body);
        let root = doc.root_element();
        let s = &self.selectors;

        let title = dom::text(root, &s.title);
        let author = dom::text_containing(root, &s.info_meta, "Author")
            .replacen("Author:", "", 1)
            .trim()
            .to_string();
        let description = dom::text(root, &s.description);
        let image = self.resolve_url(&dom::attr(root, &s.cover, "src").unwrap_or_default());

        let genres: Vec<String> = dom::text_containing(root, &s.info_meta, "Genre")
            .replacen("Genre:", "", 1)
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect();

        let status = MangaStatus::from_label(&dom::text_containing(root, &s.info_meta, "Status"));

        SeriesSummary {
            id: manga_id.to_string(),
            title,
            image,
            artist: author.clone(),
            author,
            description,
            status,
            tags: TagSection::genres(genres).into_iter().collect(),
            rating: 0.0,
        }
    }

    /// Parses the chapter archive fragment. Returned oldest first.
    fn parse_chapters(&self, manga_id: &str, body: &str) -> Vec<ChapterRef> {
        let doc = Html::parse_document(body);
        let s = &self.selectors;
        let time = Utc::now();

        let mut chapters: Vec<ChapterRef> = dom::select_all(doc.root_element(), &s.chapter_item)
            .into_iter()
            .filter_map(|item| {
                let href = dom::attr(item, &s.chapter_link, "href")?;
                let name = dom::text(item, &s.chapter_name);
                let chapter_num = CHAPTER_NUM_REGEX
                    .find(&name)
                    .and_then(|m| m.as_str().parse::<f64>().ok())
                    .unwrap_or(0.0);

                Some(ChapterRef {
                    id: self.resolve_url(&href),
                    series_id: manga_id.to_string(),
                    name,
                    chapter_num,
                    lang_code: LANG_CODE.to_string(),
                    time,
                })
            })
            .collect();

        // The archive lists newest first
        chapters.reverse();
        chapters
    }

    fn parse_chapter_html(&self, body: &str) -> String {
        let doc = Html::parse_document(body);

        dom::select_all(doc.root_element(), &self.selectors.paragraph)
            .into_iter()
            .map(dom::own_text)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(PARAGRAPH_SEPARATOR)
    }

    /// Parses the rows of a search or listing page.
    fn parse_tiles(&self, body: &str) -> Vec<ListingTile> {
        let doc = Html::parse_document(body);
        let s = &self.selectors;

        dom::select_all(doc.root_element(), &s.row)
            .into_iter()
            .map(|row| {
                let latest = dom::text(row, &s.row_latest);
                let href = dom::attr(row, &s.row_link, "href").unwrap_or_default();

                ListingTile {
                    id: self.resolve_url(&href),
                    image: self.resolve_url(
                        &dom::attr(row, &s.row_cover, "data-src").unwrap_or_default(),
                    ),
                    title: dom::text(row, &s.row_title),
                    subtitle: if latest.is_empty() {
                        SITE_NAME.to_string()
                    } else {
                        latest
                    },
                }
            })
            .collect()
    }

    async fn fetch_tiles(&self, url: String) -> Result<Vec<ListingTile>, ScraperError> {
        let body = self.fetcher.fetch(&Request::get(url)).await?;
        let tiles = self.parse_tiles(&body);
        debug!("Parsed {} listing rows", tiles.len());
        Ok(tiles)
    }
}

#[async_trait]
impl Source for AllNovelBin {
    fn info(&self) -> &'static SourceInfo {
        &INFO
    }

    fn can_handle(&self, url: &str) -> bool {
        let Ok(url) = Url::parse(url) else {
            return false;
        };

        match (url.host_str(), self.base_url.host_str()) {
            (Some(host), Some(site)) => {
                host == site || host.strip_prefix("www.") == Some(site)
            }
            _ => false,
        }
    }

    async fn get_manga_details(&self, manga_id: &str) -> Result<SeriesSummary, ScraperError> {
        let request = Request::get(manga_id)
            .header("referer", self.root())
            .header("user-agent", self.user_agent.as_str());

        let body = self.fetcher.fetch(&request).await?;
        Ok(self.parse_series(manga_id, &body))
    }

    async fn get_chapters(&self, manga_id: &str) -> Result<Vec<ChapterRef>, ScraperError> {
        let novel_id = Self::extract_novel_id(manga_id)?;

        let url = self.site_url(&format!("/ajax/chapter-archive?novelId={}", novel_id));
        let request = Request::get(url)
            .header("referer", manga_id)
            .header("x-requested-with", "XMLHttpRequest");

        let body = self.fetcher.fetch(&request).await?;
        let chapters = self.parse_chapters(manga_id, &body);
        debug!("Found {} chapters for novel {}", chapters.len(), novel_id);
        Ok(chapters)
    }

    async fn get_chapter_details(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<ChapterContent, ScraperError> {
        let request = Request::get(chapter_id).header("referer", manga_id);

        let body = self.fetcher.fetch(&request).await?;

        Ok(ChapterContent {
            id: chapter_id.to_string(),
            series_id: manga_id.to_string(),
            lang_code: LANG_CODE.to_string(),
            pages: Vec::new(),
            long_strip: false,
            html: self.parse_chapter_html(&body),
        })
    }

    async fn get_search_results(
        &self,
        query: Option<&str>,
    ) -> Result<Vec<ListingTile>, ScraperError> {
        let request = Request::get(self.search_url(query.unwrap_or_default()))
            .header("user-agent", self.user_agent.as_str());

        let body = self.fetcher.fetch(&request).await?;
        Ok(self.parse_tiles(&body))
    }

    async fn get_home_sections(
        &self,
        emit: &(dyn Fn(HomeSection) + Send + Sync),
    ) -> Result<(), ScraperError> {
        for def in &HOME_SECTIONS {
            emit(def.section(Vec::new()));
        }

        let loads = HOME_SECTIONS.iter().map(|def| async move {
            let result = self.fetch_tiles(self.section_url(def, None)).await;
            if let Err(e) = &result {
                warn!("Home section '{}' failed: {}", def.id, e);
            }
            let items = result?;
            emit(def.section(items));
            Ok::<(), ScraperError>(())
        });

        join_all(loads).await.into_iter().collect()
    }

    async fn get_view_more_items(
        &self,
        section_id: &str,
        state: Option<PageState>,
    ) -> Result<PagedTiles, ScraperError> {
        let Some(def) = SectionDef::find(section_id) else {
            debug!("Unknown section '{}'", section_id);
            return Ok(PagedTiles {
                tiles: Vec::new(),
                next: None,
            });
        };

        let state = state.unwrap_or_default();
        let tiles = self.fetch_tiles(self.section_url(def, Some(state))).await?;

        Ok(PagedTiles {
            tiles,
            next: Some(state.next()),
        })
    }
}
