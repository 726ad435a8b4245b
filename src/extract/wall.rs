//! Connecting Wall (round 3)

use crate::extract::fallback::parse_wall_raw_text;
use crate::extract::{dom, find_round_heading, round_section};
use crate::model::{Wall, WallGroup};
use scraper::{ElementRef, Html};

const GROUP_COUNT: usize = 4;

/// Parses every wall of round 3
///
/// Each `h3` sub-heading followed by a `div.question` block yields one wall.
/// Blocks without a `div.wall-container` go through the raw-text fallback.
pub fn parse_wall_round(document: &Html) -> Vec<Wall> {
    let Some(heading) = find_round_heading(document, 3) else {
        tracing::debug!("Round 3 heading not found");
        return Vec::new();
    };

    let mut walls = Vec::new();
    let mut pending_label: Option<String> = None;

    for element in round_section(heading) {
        if dom::is_tag(&element, "h3") {
            pending_label = Some(dom::clean_text(element));
        } else if dom::is_tag(&element, "div") && dom::has_class(&element, "question") {
            if let Some(label) = pending_label.take() {
                walls.push(Wall {
                    label,
                    groups: parse_question_block(element),
                });
            }
        }
    }

    walls
}

fn parse_question_block(question: ElementRef<'_>) -> Vec<WallGroup> {
    match dom::find_first(question, "div", Some("wall-container")) {
        Some(container) => (1..=GROUP_COUNT)
            .map(|group| parse_group(container, group))
            .collect(),
        None => {
            let text = dom::clean_text(question);
            if text.is_empty() {
                Vec::new()
            } else {
                tracing::debug!("Wall without container, using raw text");
                parse_wall_raw_text(&text)
            }
        }
    }
}

/// Items come from cells classed `groupN-clue`; the connection from the
/// back of `label.groupN-answer`. Missing pieces stay empty.
fn parse_group(container: ElementRef<'_>, group: usize) -> WallGroup {
    let items = dom::find_all_class_containing(container, "div", &format!("group{group}-clue"))
        .into_iter()
        .filter_map(|cell| dom::find_first(cell, "div", Some("clue")))
        .map(dom::clean_text)
        .filter(|text| !text.is_empty())
        .collect();

    let answer_class = format!("group{group}-answer");
    let connection = dom::find_first(container, "label", Some(answer_class.as_str()))
        .and_then(|label| dom::find_first(label, "div", Some("back")))
        .map(dom::clean_text)
        .unwrap_or_default();

    WallGroup::structured(items, connection)
}
