use chrono::{DateTime, Utc};
use compass_core::{FeedbackEntry, Result, Role, Turn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::feedback::FeedbackLedger;
use crate::store::History;

/// Counters describing a session at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub questions: usize,
    pub answered: usize,
    pub failed: usize,
    pub pending: usize,
    pub positive: usize,
    pub negative: usize,
}

impl SessionSummary {
    pub fn collect(history: &History, ledger: &FeedbackLedger, pending: usize) -> Self {
        let mut summary = Self {
            pending,
            ..Default::default()
        };

        for turn in history {
            match turn.role {
                Role::User => summary.questions += 1,
                Role::System if turn.is_failed() => summary.failed += 1,
                Role::System => summary.answered += 1,
            }
        }

        let tally = ledger.tally();
        summary.positive = tally.positive;
        summary.negative = tally.negative;
        summary
    }
}

/// Exportable record of a session: every turn plus the feedback given on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub session_id: Uuid,
    pub exported_at: DateTime<Utc>,
    pub turns: Vec<Turn>,
    pub feedback: Vec<FeedbackEntry>,
    pub summary: SessionSummary,
}

impl Transcript {
    pub fn new(session_id: Uuid, history: &History, ledger: &FeedbackLedger, pending: usize) -> Self {
        Self {
            session_id,
            exported_at: Utc::now(),
            turns: history.to_vec(),
            feedback: ledger.entries(),
            summary: SessionSummary::collect(history, ledger, pending),
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.session_id)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the transcript as pretty JSON, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, self.to_json_pretty()?)?;

        info!("Exported session {} to {:?}", self.session_id, path);
        Ok(())
    }
}
