use serde::{Deserialize, Serialize};

/// A single clue of a connection question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Clue {
    /// Plain text clue
    Text { text: String },

    /// Picture clue
    Image { url: String, alt: String },

    /// Music clue
    Audio { url: String },
}

impl Clue {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// One question of round 1 or 2
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionQuestion {
    /// Canonical index name (Greek letter or Egyptian glyph), or the raw
    /// heading text when neither vocabulary matches
    pub label: String,
    pub clues: Vec<Clue>,
    pub answer: String,
}

/// One Connecting Wall puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wall {
    pub label: String,
    pub groups: Vec<WallGroup>,
}

impl Wall {
    /// A well-formed wall has four groups of four items, each with a connection
    pub fn is_complete(&self) -> bool {
        self.groups.len() == 4
            && self.groups.iter().all(|group| match group {
                WallGroup::Structured { items, connection } => {
                    items.len() == 4 && !connection.is_empty()
                }
                WallGroup::Raw { .. } => false,
            })
    }
}

/// One group of a wall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WallGroup {
    /// Items and connection located in the markup (or split from raw text)
    Structured {
        items: Vec<String>,
        connection: String,
    },

    /// Text that could not be split into items and a connection
    Raw { raw_text: String },
}

impl WallGroup {
    pub fn structured(items: Vec<String>, connection: impl Into<String>) -> Self {
        Self::Structured {
            items,
            connection: connection.into(),
        }
    }
}

/// One category of the missing-vowels round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VowelCategory {
    pub category: String,
    /// Clues in the order they are revealed
    pub clues: Vec<VowelClue>,
    /// Unparsed round text, set only when no category could be recovered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl VowelCategory {
    pub fn new(category: impl Into<String>, clues: Vec<VowelClue>) -> Self {
        Self {
            category: category.into(),
            clues,
            raw_text: None,
        }
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            category: String::new(),
            clues: Vec::new(),
            raw_text: Some(text.into()),
        }
    }
}

/// A consonant-only puzzle string and its answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VowelClue {
    pub clue: String,
    pub answer: String,
}

impl VowelClue {
    pub fn new(clue: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            clue: clue.into(),
            answer: answer.into(),
        }
    }
}
