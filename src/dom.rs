//! Small query layer over `scraper`.
//!
//! Extraction code only needs three things from a parsed page: every node
//! matching a selector, an attribute of the first match, and the text of
//! the matches. Missing nodes read as empty rather than failing.

use scraper::{ElementRef, Selector};

/// Returns every element under `root` matching `selector`, in document order.
pub fn select_all<'a>(root: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    root.select(selector).collect()
}

/// Reads `name` from the first element under `root` matching `selector`.
///
/// Surrounding whitespace is trimmed; blank values read as `None`.
pub fn attr(root: ElementRef<'_>, selector: &Selector, name: &str) -> Option<String> {
    root.select(selector)
        .next()
        .and_then(|elem| elem.value().attr(name))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Returns the concatenated text of every match, trimmed.
pub fn text(root: ElementRef<'_>, selector: &Selector) -> String {
    root.select(selector)
        .map(|elem| elem.text().collect::<String>())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Returns the trimmed text of a single element.
pub fn own_text(elem: ElementRef<'_>) -> String {
    elem.text().collect::<String>().trim().to_string()
}

/// Returns the concatenated text of every match whose text, including that of
/// its descendants, contains `needle`.
///
/// Stands in for jQuery-style `:contains()`, which CSS selectors lack.
pub fn text_containing(root: ElementRef<'_>, selector: &Selector, needle: &str) -> String {
    root.select(selector)
        .map(|elem| elem.text().collect::<String>())
        .filter(|t| t.contains(needle))
        .collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn sel(css: &str) -> Selector {
        Selector::parse(css).unwrap()
    }

    #[test]
    fn test_attr_first_match() {
        let doc = Html::parse_fragment(r#"<img data-src=" a.jpg "><img data-src="b.jpg">"#);
        assert_eq!(
            attr(doc.root_element(), &sel("img"), "data-src"),
            Some("a.jpg".to_string())
        );
        assert_eq!(attr(doc.root_element(), &sel("img"), "src"), None);
        assert_eq!(attr(doc.root_element(), &sel("a"), "href"), None);
    }

    #[test]
    fn test_text_concatenates_matches() {
        let doc = Html::parse_fragment("<p> one </p><p>two </p>");
        assert_eq!(text(doc.root_element(), &sel("p")), "one two");
        assert_eq!(text(doc.root_element(), &sel("span")), "");
    }

    #[test]
    fn test_select_all_order() {
        let doc = Html::parse_fragment("<ul><li>1</li><li>2</li><li>3</li></ul>");
        let items: Vec<String> = select_all(doc.root_element(), &sel("li"))
            .into_iter()
            .map(own_text)
            .collect();
        assert_eq!(items, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_text_containing() {
        let doc = Html::parse_fragment(
            "<ul><li>Author: Jane</li><li>Genre: Action</li><li>Status: Ongoing</li></ul>",
        );
        assert_eq!(
            text_containing(doc.root_element(), &sel("li"), "Genre"),
            "Genre: Action"
        );
        assert_eq!(text_containing(doc.root_element(), &sel("li"), "Source"), "");

        // Label split across a child element still matches
        let doc = Html::parse_fragment("<ul><li><h3>Status:</h3> <a>Completed</a></li></ul>");
        assert_eq!(
            text_containing(doc.root_element(), &sel("li"), "Status:"),
            "Status: Completed"
        );
    }
}
