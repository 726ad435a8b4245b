//! Tree navigation helpers over `scraper`
//!
//! The extractors only need a handful of BeautifulSoup-like lookups: find by
//! tag and class, match class fragments, walk following siblings, and read
//! normalized text.

use scraper::{ElementRef, Html};

pub fn is_tag(element: &ElementRef<'_>, tag: &str) -> bool {
    element.value().name() == tag
}

/// Exact match against one of the element's classes
pub fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Substring match against the element's classes (e.g. `group2-clue`)
pub fn class_contains(element: &ElementRef<'_>, fragment: &str) -> bool {
    element.value().classes().any(|c| c.contains(fragment))
}

fn matches(element: &ElementRef<'_>, tag: &str, class: Option<&str>) -> bool {
    is_tag(element, tag) && class.map_or(true, |c| has_class(element, c))
}

/// All elements below `root` (excluding it) in document order
pub fn descendants<'a>(root: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    root.descendants().skip(1).filter_map(ElementRef::wrap)
}

pub fn find_first<'a>(
    root: ElementRef<'a>,
    tag: &str,
    class: Option<&str>,
) -> Option<ElementRef<'a>> {
    descendants(root).find(|e| matches(e, tag, class))
}

pub fn find_all<'a>(root: ElementRef<'a>, tag: &str, class: Option<&str>) -> Vec<ElementRef<'a>> {
    descendants(root).filter(|e| matches(e, tag, class)).collect()
}

/// Like `find_all`, with the class given as a fragment of a class name
pub fn find_all_class_containing<'a>(
    root: ElementRef<'a>,
    tag: &str,
    fragment: &str,
) -> Vec<ElementRef<'a>> {
    descendants(root)
        .filter(|e| is_tag(e, tag) && class_contains(e, fragment))
        .collect()
}

/// Searches the whole document
pub fn find_in_document<'a>(
    document: &'a Html,
    tag: &str,
    class: Option<&str>,
) -> Option<ElementRef<'a>> {
    find_first(document.root_element(), tag, class)
}

/// Element children of `element`, skipping text and comment nodes
pub fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

/// Element siblings after `element`, in document order
pub fn following_siblings<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.next_siblings().filter_map(ElementRef::wrap)
}

pub fn attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name)
}

/// Text content with runs of whitespace collapsed to single spaces
///
/// Text nodes are joined with a space so adjacent cells don't run together.
/// Entities are already decoded by the parser.
pub fn clean_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
