//! Last-resort parsers for pages without structured round markup
//!
//! Both work on flattened text and are approximate. A word without vowels
//! that is really a proper noun will be read as a clue, for instance.

use crate::model::{VowelCategory, VowelClue, WallGroup};
use regex::Regex;
use std::sync::LazyLock;

static ANSWER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+Answer\s*").expect("hardcoded regex pattern is valid"));

static CONSONANTS_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[B-DF-HJ-NP-TV-Zb-df-hj-np-tv-z]+$").expect("hardcoded regex pattern is valid")
});

/// Splits flattened wall text into groups on the `Answer` marker
///
/// A segment of five or more words becomes four items plus a connection;
/// shorter segments are kept as raw text.
pub fn parse_wall_raw_text(text: &str) -> Vec<WallGroup> {
    ANSWER_MARKER
        .split(text)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let words: Vec<&str> = segment.split_whitespace().collect();
            if words.len() >= 5 {
                let items = words[..4].iter().map(|w| w.to_string()).collect();
                WallGroup::structured(items, words[4..].join(" "))
            } else {
                WallGroup::Raw {
                    raw_text: segment.to_string(),
                }
            }
        })
        .collect()
}

fn has_vowel(word: &str) -> bool {
    word.chars().any(|c| "aeiouAEIOU".contains(c))
}

fn is_consonant_word(word: &str) -> bool {
    !has_vowel(word) && CONSONANTS_ONLY.is_match(word)
}

/// Recovers categories and clues from flattened missing-vowels text
///
/// A run of vowel-bearing words followed by a vowel-less word names a new
/// category; any other vowel-bearing run answers the latest clue. Runs of
/// consonant-only words are clues. If nothing is recovered the text is kept
/// whole in a single raw category.
pub fn parse_vowels_raw_text(text: &str) -> Vec<VowelCategory> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut categories = Vec::new();
    let mut current_category = String::new();
    let mut current_clues: Vec<VowelClue> = Vec::new();
    let mut i = 0;

    while i < words.len() {
        let word = words[i];

        if has_vowel(word) {
            let end = words[i..]
                .iter()
                .position(|w| !has_vowel(w))
                .map_or(words.len(), |offset| i + offset);
            let phrase = words[i..end].join(" ");

            if end < words.len() {
                if !current_category.is_empty() || !current_clues.is_empty() {
                    categories.push(VowelCategory::new(
                        std::mem::take(&mut current_category),
                        std::mem::take(&mut current_clues),
                    ));
                }
                current_category = phrase;
            } else {
                match current_clues.last_mut() {
                    Some(last) => last.answer = phrase,
                    None => current_clues.push(VowelClue::new("", phrase)),
                }
            }
            i = end;
        } else {
            let end = words[i + 1..]
                .iter()
                .position(|w| !is_consonant_word(w))
                .map_or(words.len(), |offset| i + 1 + offset);
            current_clues.push(VowelClue::new(words[i..end].join(" "), ""));
            i = end;
        }
    }

    if !current_category.is_empty() || !current_clues.is_empty() {
        categories.push(VowelCategory::new(current_category, current_clues));
    }

    if categories.is_empty() {
        vec![VowelCategory::raw(text)]
    } else {
        categories
    }
}
