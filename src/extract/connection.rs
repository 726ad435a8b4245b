//! Connection rounds (rounds 1 and 2)
//!
//! Each question is an `h3` heading followed by a grid holding up to four
//! clue cells and an answer card.

use crate::extract::{dom, find_round_heading, round_section};
use crate::model::{Clue, ConnectionQuestion};
use scraper::{ElementRef, Html};

/// Greek-letter question indices with their single-character variants
const GREEK_LETTERS: [(&str, &[&str]); 6] = [
    ("Alpha", &["𝝰", "α"]),
    ("Beta", &["𝝱", "β"]),
    ("Gamma", &["𝝲", "γ"]),
    ("Delta", &["𝝳", "δ"]),
    ("Epsilon", &["𝝴", "ε"]),
    ("Zeta", &["𝝵", "ζ"]),
];

/// Egyptian hieroglyph question indices
const EGYPTIAN_GLYPHS: [&str; 6] = [
    "Two Reeds",
    "Horned Viper",
    "Lion",
    "Water",
    "Twisted Flax",
    "Eye of Horus",
];

/// Positional placeholders rendered in unrevealed clue cells
const PLACEHOLDERS: [&str; 4] = ["Clue 2", "Clue 3", "Clue 4", "?"];

const AUDIO_EXTENSIONS: [&str; 4] = [".mp3", ".m4a", ".ogg", ".wav"];

/// Parses every question of connection round `round`
///
/// A missing round heading yields no questions; a heading with no grid
/// after it is skipped.
pub fn parse_connection_round(document: &Html, round: u8) -> Vec<ConnectionQuestion> {
    let Some(heading) = find_round_heading(document, round) else {
        tracing::debug!("Round {} heading not found", round);
        return Vec::new();
    };

    let mut questions = Vec::new();
    let mut pending_label: Option<String> = None;

    for element in round_section(heading) {
        if dom::is_tag(&element, "h3") {
            pending_label = Some(dom::clean_text(element));
        } else if is_grid(&element) {
            if let Some(label_text) = pending_label.take() {
                questions.push(ConnectionQuestion {
                    label: resolve_label(&label_text),
                    clues: extract_clues(element),
                    answer: extract_answer(element),
                });
            }
        }
    }

    questions
}

fn is_grid(element: &ElementRef<'_>) -> bool {
    dom::is_tag(element, "div")
        && (dom::has_class(element, "round") || dom::has_class(element, "grid-container"))
}

/// Maps heading text to its canonical index name
///
/// Greek letters match by name or symbol; glyph names match
/// case-insensitively and take precedence. Anything else keeps the raw text.
pub fn resolve_label(heading: &str) -> String {
    let lowered = heading.to_lowercase();
    if let Some(glyph) = EGYPTIAN_GLYPHS
        .iter()
        .find(|glyph| lowered.contains(&glyph.to_lowercase()))
    {
        return glyph.to_string();
    }

    GREEK_LETTERS
        .iter()
        .find(|(name, symbols)| heading.contains(name) || symbols.iter().any(|s| heading.contains(s)))
        .map(|(name, _)| name.to_string())
        .unwrap_or_else(|| heading.to_string())
}

/// Classifies every clue cell of a grid, dropping placeholders
pub fn extract_clues(grid: ElementRef<'_>) -> Vec<Clue> {
    dom::find_all(grid, "div", Some("clue"))
        .into_iter()
        .filter_map(classify_clue)
        .collect()
}

/// Audio link > image > revealable card > plain text
pub fn classify_clue(cell: ElementRef<'_>) -> Option<Clue> {
    if let Some(url) = find_audio_link(cell) {
        return Some(Clue::Audio {
            url: url.to_string(),
        });
    }

    if let Some(img) = dom::find_first(cell, "img", None) {
        return Some(Clue::Image {
            url: dom::attr(&img, "src").unwrap_or_default().to_string(),
            alt: dom::attr(&img, "alt").unwrap_or_default().to_string(),
        });
    }

    if let Some(card) = dom::find_first(cell, "div", Some("card")) {
        return dom::find_first(card, "div", Some("back"))
            .map(dom::clean_text)
            .filter(|text| !text.is_empty())
            .map(Clue::text);
    }

    let text = dom::clean_text(cell);
    if text.is_empty() || PLACEHOLDERS.contains(&text.as_str()) {
        return None;
    }
    Some(Clue::text(text))
}

fn find_audio_link<'a>(cell: ElementRef<'a>) -> Option<&'a str> {
    dom::find_all(cell, "a", None)
        .into_iter()
        .filter_map(|a| dom::attr(&a, "href"))
        .find(|href| {
            let href = href.to_ascii_lowercase();
            AUDIO_EXTENSIONS.iter().any(|ext| href.ends_with(ext))
        })
}

/// The revealed answer of a grid, or empty if the grid has none
pub fn extract_answer(grid: ElementRef<'_>) -> String {
    let Some(answer) = dom::find_first(grid, "div", Some("answer")) else {
        return String::new();
    };
    match dom::find_first(answer, "div", Some("back")) {
        Some(back) => dom::clean_text(back),
        None => dom::clean_text(answer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_clue(html: &str) -> Option<Clue> {
        let doc = Html::parse_document(html);
        let cell = dom::find_in_document(&doc, "div", Some("clue")).unwrap();
        classify_clue(cell)
    }

    #[test]
    fn test_resolve_greek_label() {
        assert_eq!(resolve_label("Question Gamma"), "Gamma");
        assert_eq!(resolve_label("𝝲"), "Gamma");
        assert_eq!(resolve_label("Question δ"), "Delta");
    }

    #[test]
    fn test_resolve_glyph_label() {
        assert_eq!(resolve_label("Eye of Horus"), "Eye of Horus");
        assert_eq!(resolve_label("twisted flax"), "Twisted Flax");
    }

    #[test]
    fn test_unmatched_label_keeps_raw_text() {
        assert_eq!(resolve_label("Question 1"), "Question 1");
    }

    #[test]
    fn test_audio_clue() {
        let clue = first_clue(
            r#"<div class="clue"><a href="https://ocdb.cc/media/theme.mp3">Play</a></div>"#,
        );
        assert_eq!(
            clue,
            Some(Clue::Audio {
                url: "https://ocdb.cc/media/theme.mp3".to_string()
            })
        );
    }

    #[test]
    fn test_audio_beats_image() {
        let clue = first_clue(
            r#"<div class="clue"><img src="/sleeve.jpg"><a href="/track.MP3">Play</a></div>"#,
        );
        assert!(matches!(clue, Some(Clue::Audio { .. })));
    }

    #[test]
    fn test_image_clue() {
        let clue = first_clue(r#"<div class="clue"><img src="/pics/a.jpg" alt="A lighthouse"></div>"#);
        assert_eq!(
            clue,
            Some(Clue::Image {
                url: "/pics/a.jpg".to_string(),
                alt: "A lighthouse".to_string()
            })
        );
    }

    #[test]
    fn test_card_clue_uses_back() {
        let clue = first_clue(
            r#"<div class="clue"><div class="card"><div class="front">Clue 2</div><div class="back">Mercury</div></div></div>"#,
        );
        assert_eq!(clue, Some(Clue::text("Mercury")));
    }

    #[test]
    fn test_placeholder_clue_is_dropped() {
        assert_eq!(first_clue(r#"<div class="clue">Clue 3</div>"#), None);
        assert_eq!(first_clue(r#"<div class="clue"> ? </div>"#), None);
        assert_eq!(first_clue(r#"<div class="clue">  </div>"#), None);
    }

    #[test]
    fn test_parse_round_with_labels_clues_and_answer() {
        let doc = Html::parse_document(
            r#"<body>
            <h2 id="round1">Round 1: Connections</h2>
            <h3>Two Reeds</h3>
            <div class="round">
                <div class="clue">Ant</div>
                <div class="clue">Bee</div>
                <div class="clue">Clue 3</div>
                <div class="clue"><div class="card"><div class="back">Wasp</div></div></div>
                <div class="answer"><div class="card"><div class="front">?</div><div class="back">Insects</div></div></div>
            </div>
            <h3>Question Beta</h3>
            <div class="grid-container">
                <div class="clue"><a href="/m/a.mp3">listen</a></div>
                <div class="answer">Songs</div>
            </div>
            <h2 id="round2">Round 2: Sequences</h2>
            <h3>Lion</h3>
            <div class="round"><div class="clue">Not round one</div></div>
            </body>"#,
        );

        let questions = parse_connection_round(&doc, 1);
        assert_eq!(questions.len(), 2);

        assert_eq!(questions[0].label, "Two Reeds");
        assert_eq!(
            questions[0].clues,
            vec![Clue::text("Ant"), Clue::text("Bee"), Clue::text("Wasp")]
        );
        assert_eq!(questions[0].answer, "Insects");

        assert_eq!(questions[1].label, "Beta");
        assert!(matches!(questions[1].clues[0], Clue::Audio { .. }));
        assert_eq!(questions[1].answer, "Songs");

        let round2 = parse_connection_round(&doc, 2);
        assert_eq!(round2.len(), 1);
        assert_eq!(round2[0].label, "Lion");
        assert_eq!(round2[0].answer, "");
    }

    #[test]
    fn test_round_ends_at_heading_with_id_only() {
        let doc = Html::parse_document(
            r#"<body>
            <h2 id="round1">What's the Connection?</h2>
            <h3>Two Reeds</h3>
            <div class="round"><div class="clue">Ant</div></div>
            <h2 id="round2">What Comes Fourth?</h2>
            <h3>Lion</h3>
            <div class="round"><div class="clue">Bee</div></div>
            </body>"#,
        );

        let labels: Vec<String> = parse_connection_round(&doc, 1)
            .into_iter()
            .map(|q| q.label)
            .collect();
        assert_eq!(labels, vec!["Two Reeds".to_string()]);

        let round2 = parse_connection_round(&doc, 2);
        assert_eq!(round2.len(), 1);
        assert_eq!(round2[0].label, "Lion");
    }

    #[test]
    fn test_heading_found_by_text() {
        let doc = Html::parse_document(
            r#"<h2>Round 2</h2><h3>Question 1</h3><div class="round"><div class="clue">X</div></div>"#,
        );
        let questions = parse_connection_round(&doc, 2);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].label, "Question 1");
    }

    #[test]
    fn test_missing_round_is_empty() {
        let doc = Html::parse_document("<h2>Round 3</h2>");
        assert!(parse_connection_round(&doc, 1).is_empty());
    }
}
