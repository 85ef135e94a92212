use compass_core::{CompassError, FeedbackEntry, Result, Role, Turn, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Positive and negative verdict counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackTally {
    pub positive: usize,
    pub negative: usize,
}

/// At most one verdict per answered turn; a new verdict replaces the old one.
#[derive(Debug, Default)]
pub struct FeedbackLedger {
    entries: BTreeMap<usize, Verdict>,
}

impl FeedbackLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `verdict` for `turn`, which the caller looked up in the
    /// conversation store. Returns the verdict it replaced, if any.
    pub fn record(&mut self, turn: &Turn, verdict: Verdict) -> Result<Option<Verdict>> {
        if turn.role != Role::System {
            return Err(CompassError::invalid_turn(turn.index, "not an answer"));
        }
        if !turn.is_answer() {
            return Err(CompassError::invalid_turn(turn.index, "answer failed"));
        }

        let previous = self.entries.insert(turn.index, verdict);
        debug!("Feedback on turn {}: {:?} (was {:?})", turn.index, verdict, previous);
        Ok(previous)
    }

    pub fn get(&self, turn_index: usize) -> Option<Verdict> {
        self.entries.get(&turn_index).copied()
    }

    /// All entries ordered by turn index.
    pub fn entries(&self) -> Vec<FeedbackEntry> {
        self.entries
            .iter()
            .map(|(&turn_index, &verdict)| FeedbackEntry { turn_index, verdict })
            .collect()
    }

    pub fn tally(&self) -> FeedbackTally {
        self.entries.values().fold(FeedbackTally::default(), |mut tally, verdict| {
            match verdict {
                Verdict::Positive => tally.positive += 1,
                Verdict::Negative => tally.negative += 1,
            }
            tally
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
