/// Crawl phase definitions for tracking one crawl run
///
/// A run moves `Idle → Discovering → (Fetching → Extracting → Recording)* →
/// Checkpointing → Done`, or ends in `Interrupted` when cancelled.
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Run created, nothing requested yet
    Idle,

    /// Fetching and walking the episode listing
    Discovering,

    /// Fetching one episode page
    Fetching,

    /// Running the round extractors over a fetched page
    Extracting,

    /// Recording the outcome of one URL in progress and records
    Recording,

    /// Writing progress and records to durable storage
    Checkpointing,

    // ===== Terminal States =====
    /// All pending URLs were processed
    Done,

    /// Cancelled between two URLs; a final checkpoint was written
    Interrupted,
}

impl CrawlPhase {
    /// Returns true if the run has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Interrupted)
    }

    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;
        matches!(
            (self, next),
            (Idle, Discovering)
                | (Discovering, Fetching)
                | (Discovering, Checkpointing)
                | (Fetching, Extracting)
                | (Fetching, Recording)
                | (Extracting, Recording)
                | (Recording, Fetching)
                | (Recording, Checkpointing)
                | (Checkpointing, Fetching)
                | (Checkpointing, Done)
                | (Checkpointing, Interrupted)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Discovering => "discovering",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Recording => "recording",
            Self::Checkpointing => "checkpointing",
            Self::Done => "done",
            Self::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(CrawlPhase::Done.is_terminal());
        assert!(CrawlPhase::Interrupted.is_terminal());

        assert!(!CrawlPhase::Idle.is_terminal());
        assert!(!CrawlPhase::Fetching.is_terminal());
        assert!(!CrawlPhase::Checkpointing.is_terminal());
    }

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            CrawlPhase::Idle,
            CrawlPhase::Discovering,
            CrawlPhase::Fetching,
            CrawlPhase::Extracting,
            CrawlPhase::Recording,
            CrawlPhase::Checkpointing,
            CrawlPhase::Fetching,
            CrawlPhase::Recording,
            CrawlPhase::Checkpointing,
            CrawlPhase::Done,
        ];
        for pair in path.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_interruption_requires_checkpoint() {
        assert!(!CrawlPhase::Fetching.can_transition_to(CrawlPhase::Interrupted));
        assert!(!CrawlPhase::Recording.can_transition_to(CrawlPhase::Interrupted));
        assert!(CrawlPhase::Checkpointing.can_transition_to(CrawlPhase::Interrupted));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for next in [CrawlPhase::Idle, CrawlPhase::Discovering, CrawlPhase::Fetching] {
            assert!(!CrawlPhase::Done.can_transition_to(next));
            assert!(!CrawlPhase::Interrupted.can_transition_to(next));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CrawlPhase::Checkpointing), "checkpointing");
        assert_eq!(format!("{}", CrawlPhase::Interrupted), "interrupted");
    }
}
