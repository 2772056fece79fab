//! Console output formatting with ANSI color support.
//!
//! Provides styled terminal output with automatic TTY detection
//! and respect for the NO_COLOR environment variable.

use crate::model::{ChapterRef, HomeSection, ListingTile, MangaStatus, SeriesSummary};
use std::io::{self, IsTerminal};

/// ANSI style codes for terminal formatting.
#[derive(Debug, Clone, Copy)]
pub enum Style {
    Bold,
    Dim,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
}

impl Style {
    /// Returns the ANSI escape code for this style.
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "1",
            Style::Dim => "2",
            Style::Red => "31",
            Style::Green => "32",
            Style::Yellow => "33",
            Style::Blue => "34",
            Style::Magenta => "35",
            Style::Cyan => "36",
            Style::Gray => "90",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Console output handler with color support detection.
#[derive(Debug)]
pub struct Console {
    colors_enabled: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Creates a new Console instance, detecting color support.
    ///
    /// Colors are disabled if:
    /// - The `NO_COLOR` environment variable is set
    /// - stdout is not a terminal (TTY)
    pub fn new() -> Self {
        let colors_enabled = std::env::var("NO_COLOR").is_err() && io::stdout().is_terminal();

        Self { colors_enabled }
    }

    /// Creates a Console with colors explicitly enabled or disabled.
    pub fn with_colors(enabled: bool) -> Self {
        Self {
            colors_enabled: enabled,
        }
    }

    /// Applies ANSI styles to text if colors are enabled.
    pub fn style(&self, text: &str, styles: &[Style]) -> String {
        if !self.colors_enabled || styles.is_empty() {
            return text.to_string();
        }

        let codes: Vec<&str> = styles.iter().map(|s| s.code()).collect();
        format!("\x1b[{}m{}{}", codes.join(";"), text, RESET)
    }

    /// Creates a colored label like `[INFO]`.
    pub fn label(&self, label: &str, color: Style) -> String {
        let styled = self.style(label, &[color, Style::Bold]);
        format!("[{}]", styled)
    }

    /// Prints an info message with blue `[INFO]` label.
    pub fn info(&self, message: &str) {
        println!("{} {}", self.label("INFO", Style::Blue), message);
    }

    /// Prints a success message with green `[OK]` label.
    pub fn success(&self, message: &str) {
        println!("{} {}", self.label("OK", Style::Green), message);
    }

    /// Prints a warning message with yellow `[WARN]` label.
    pub fn warning(&self, message: &str) {
        println!("{} {}", self.label("WARN", Style::Yellow), message);
    }

    /// Prints an error message with red `[ERROR]` label.
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.label("ERROR", Style::Red), message);
    }

    /// Prints a section header in magenta bold.
    pub fn section(&self, message: &str) {
        println!();
        println!("{}", self.style(message, &[Style::Magenta, Style::Bold]));
    }

    /// Returns text styled as muted (dim gray).
    pub fn muted(&self, text: &str) -> String {
        self.style(text, &[Style::Gray, Style::Dim])
    }

    /// Formats a series status badge.
    pub fn status(&self, status: MangaStatus) -> String {
        match status {
            MangaStatus::Ongoing => self.style("ONGOING", &[Style::Yellow, Style::Bold]),
            MangaStatus::Completed => self.style("COMPLETED", &[Style::Green, Style::Bold]),
        }
    }

    /// Formats a listing tile as `title - subtitle` followed by its link.
    pub fn format_tile(&self, tile: &ListingTile) -> String {
        format!(
            "{} {} {}\n    {}",
            self.style(&tile.title, &[Style::Bold]),
            self.muted("-"),
            tile.subtitle,
            self.style(&tile.id, &[Style::Cyan]),
        )
    }

    /// Formats a chapter entry with its number.
    pub fn format_chapter(&self, chapter: &ChapterRef) -> String {
        format!(
            "{} {}\n    {}",
            self.style(&format!("#{:<5}", chapter.chapter_num), &[Style::Green]),
            chapter.name,
            self.muted(&chapter.id),
        )
    }

    /// Prints a list of tiles.
    pub fn tiles(&self, tiles: &[ListingTile]) {
        for tile in tiles {
            println!("  {}", self.format_tile(tile));
        }
    }

    /// Prints a loaded home section.
    pub fn home_section(&self, section: &HomeSection) {
        self.section(&format!("{} ({})", section.title, section.id));
        self.tiles(&section.items);
    }

    /// Prints a series summary.
    pub fn series(&self, manga: &SeriesSummary) {
        self.section(&manga.title);
        println!("  Author: {}", manga.author);
        println!("  Status: {}", self.status(manga.status));
        for group in &manga.tags {
            let labels: Vec<&str> = group.tags.iter().map(|t| t.label.as_str()).collect();
            println!("  {}: {}", group.label, labels.join(", "));
        }
        println!("  Cover: {}", self.muted(&manga.image));
        println!();
        println!("{}", manga.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile() -> ListingTile {
        ListingTile {
            id: "https://allnovelbin.net/novel/a".to_string(),
            image: String::new(),
            title: "Novel A".to_string(),
            subtitle: "Chapter 12".to_string(),
        }
    }

    #[test]
    fn test_style_disabled() {
        let console = Console::with_colors(false);
        assert_eq!(console.style("hello", &[Style::Red]), "hello");
    }

    #[test]
    fn test_style_enabled() {
        let console = Console::with_colors(true);
        let styled = console.style("hello", &[Style::Red]);
        assert!(styled.contains("\x1b[31m"));
        assert!(styled.contains("hello"));
        assert!(styled.contains(RESET));
    }

    #[test]
    fn test_multiple_styles() {
        let console = Console::with_colors(true);
        let styled = console.style("hello", &[Style::Bold, Style::Red]);
        assert!(styled.contains("1;31"));
    }

    #[test]
    fn test_label() {
        let console = Console::with_colors(false);
        assert_eq!(console.label("INFO", Style::Blue), "[INFO]");
    }

    #[test]
    fn test_error_label() {
        let console = Console::with_colors(true);
        let label = console.label("ERROR", Style::Red);
        assert!(label.starts_with('['));
        assert!(label.contains("1;31"));
        assert!(label.contains("ERROR"));
    }

    #[test]
    fn test_format_tile_plain() {
        let console = Console::with_colors(false);
        assert_eq!(
            console.format_tile(&tile()),
            "Novel A - Chapter 12\n    https://allnovelbin.net/novel/a"
        );
    }

    #[test]
    fn test_status_badge() {
        let console = Console::with_colors(false);
        assert_eq!(console.status(MangaStatus::Completed), "COMPLETED");
        assert_eq!(console.status(MangaStatus::Ongoing), "ONGOING");
    }
}
