//! NovelBin CLI - browse and read allnovelbin.net from the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use novelbin::config::Config;
use novelbin::console::Console;
use novelbin::model::{HomeSection, PageState};
use novelbin::sources::allnovelbin::PARAGRAPH_SEPARATOR;
use novelbin::sources::{AllNovelBin, Source};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Mutex;

/// AllNovelBin source adapter.
#[derive(Parser, Debug)]
#[command(name = "novelbin")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Print results as JSON instead of formatted text.
    #[arg(long, global = true)]
    json: bool,

    /// Use this config file instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show source metadata.
    Info,

    /// Show the details of a series.
    Details {
        /// Series detail-page URL.
        series_url: String,
    },

    /// List the chapters of a series, oldest first.
    Chapters {
        /// Series detail-page URL (must contain `novelId=`).
        series_url: String,
    },

    /// Print the text of a chapter.
    Read {
        /// Series detail-page URL.
        series_url: String,
        /// Chapter URL.
        chapter_url: String,
    },

    /// Search by title.
    Search {
        /// Search terms.
        query: Option<String>,
    },

    /// Show the home sections.
    Home,

    /// Show another page of a home section.
    More {
        /// Section id (daily_updates, hot_novels, completed_novels, popular_novels).
        section_id: String,

        /// Page to fetch (1-based).
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let console = Console::new();

    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let level = if args.verbose || config.scraping.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let source = AllNovelBin::new(&config.scraping).context("Failed to create source")?;

    match args.command {
        Command::Info => {
            let info = source.info();
            if args.json {
                return print_json(info);
            }
            console.section(&format!("{} v{}", info.name, info.version));
            console.info(info.description);
            console.info(&format!("Website: {}", info.website_base_url));
            console.info(&format!("Language: {}", info.language));
        }

        Command::Details { series_url } => {
            let manga = source
                .get_manga_details(&series_url)
                .await
                .context("Failed to fetch series details")?;
            if args.json {
                return print_json(&manga);
            }
            console.series(&manga);
        }

        Command::Chapters { series_url } => {
            let chapters = source
                .get_chapters(&series_url)
                .await
                .context("Failed to fetch chapter list")?;
            if args.json {
                return print_json(&chapters);
            }
            for chapter in &chapters {
                println!("  {}", console.format_chapter(chapter));
            }
            console.success(&format!("Found {} chapters", chapters.len()));
        }

        Command::Read {
            series_url,
            chapter_url,
        } => {
            let chapter = source
                .get_chapter_details(&series_url, &chapter_url)
                .await
                .context("Failed to fetch chapter")?;
            if args.json {
                return print_json(&chapter);
            }
            if chapter.html.is_empty() {
                console.warning("Chapter has no text");
            }
            for paragraph in chapter.html.split(PARAGRAPH_SEPARATOR) {
                println!("{}\n", paragraph);
            }
        }

        Command::Search { query } => {
            let tiles = source
                .get_search_results(query.as_deref())
                .await
                .context("Search failed")?;
            if args.json {
                return print_json(&tiles);
            }
            console.tiles(&tiles);
            console.success(&format!("{} results", tiles.len()));
        }

        Command::Home => {
            let loaded: Mutex<Vec<HomeSection>> = Mutex::new(Vec::new());
            let result = source
                .get_home_sections(&|section: HomeSection| {
                    let mut loaded = loaded.lock().unwrap_or_else(|e| e.into_inner());
                    match loaded.iter_mut().find(|s| s.id == section.id) {
                        Some(slot) => *slot = section,
                        None => loaded.push(section),
                    }
                })
                .await;

            let sections = loaded.into_inner().unwrap_or_else(|e| e.into_inner());
            if args.json {
                print_json(&sections)?;
            } else {
                for section in &sections {
                    console.home_section(section);
                }
            }
            if let Err(e) = &result {
                console.error(&format!("Some home sections failed to load: {}", e));
            }
            result.context("Failed to load home sections")?;
        }

        Command::More { section_id, page } => {
            let paged = source
                .get_view_more_items(&section_id, Some(PageState { page }))
                .await
                .context("Failed to fetch more items")?;
            if args.json {
                return print_json(&paged);
            }
            if paged.next.is_none() {
                console.warning(&format!("Unknown section: {}", section_id));
            }
            console.tiles(&paged.tiles);
        }
    }

    Ok(())
}

/// Prints a value as pretty JSON.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
