//! Missing Vowels (round 4)

use crate::extract::fallback::parse_vowels_raw_text;
use crate::extract::{dom, find_round_heading};
use crate::model::{VowelCategory, VowelClue};
use scraper::{ElementRef, Html};

/// Parses the categories of round 4 in reveal order
pub fn parse_vowels_round(document: &Html) -> Vec<VowelCategory> {
    let Some(heading) = find_round_heading(document, 4) else {
        tracing::debug!("Round 4 heading not found");
        return Vec::new();
    };

    if let Some(container) = dom::find_in_document(document, "div", Some("vowel-round")) {
        return parse_vowel_container(container);
    }

    match dom::following_siblings(heading).next() {
        Some(content) => {
            let text = dom::clean_text(content);
            if text.is_empty() {
                Vec::new()
            } else {
                tracing::debug!("Missing vowels without container, using raw text");
                parse_vowels_raw_text(&text)
            }
        }
        None => Vec::new(),
    }
}

fn parse_vowel_container(container: ElementRef<'_>) -> Vec<VowelCategory> {
    let mut categories = Vec::new();
    let mut current_category = String::new();
    let mut current_clues = Vec::new();

    for child in dom::child_elements(container) {
        if dom::has_class(&child, "category") {
            if !current_category.is_empty() || !current_clues.is_empty() {
                categories.push(VowelCategory::new(
                    std::mem::take(&mut current_category),
                    std::mem::take(&mut current_clues),
                ));
            }
            current_category = dom::clean_text(child);
        } else if dom::has_class(&child, "missing-vowels") {
            if let Some(clue) = parse_vowel_card(child) {
                current_clues.push(clue);
            }
        }
    }

    if !current_category.is_empty() || !current_clues.is_empty() {
        categories.push(VowelCategory::new(current_category, current_clues));
    }

    categories
}

/// Front holds the consonant-only puzzle, back the answer
fn parse_vowel_card(element: ElementRef<'_>) -> Option<VowelClue> {
    let card = dom::find_first(element, "div", Some("card"))?;
    let side = |class: &str| {
        dom::find_first(card, "div", Some(class))
            .map(dom::clean_text)
            .unwrap_or_default()
    };

    let clue = side("front");
    let answer = side("back");
    if clue.is_empty() && answer.is_empty() {
        return None;
    }
    Some(VowelClue::new(clue, answer))
}
