use compass_conversation::{ConversationStore, FeedbackLedger, History, SessionSummary, Transcript};
use compass_core::{AnswerClient, CompassError, Result, Turn, Verdict};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Pending,
}

/// One assistant conversation: turn history, feedback, and the answer service
/// that fills in system turns.
///
/// Store and ledger are each guarded by their own lock, held only for the
/// duration of a single append or record. The answer service call runs with
/// no lock held, so history and feedback stay available while answers are
/// outstanding, and several submissions may be in flight at once.
pub struct AssistantSession {
    id: Uuid,
    client: Arc<dyn AnswerClient>,
    store: Mutex<ConversationStore>,
    ledger: Mutex<FeedbackLedger>,
    pending: AtomicUsize,
}

impl AssistantSession {
    pub fn new(client: Arc<dyn AnswerClient>) -> Self {
        let id = Uuid::new_v4();
        info!("Started assistant session {}", id);

        Self {
            id,
            client,
            store: Mutex::new(ConversationStore::new()),
            ledger: Mutex::new(FeedbackLedger::new()),
            pending: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        if self.pending.load(Ordering::SeqCst) == 0 {
            SessionState::Idle
        } else {
            SessionState::Pending
        }
    }

    /// Ask a question and return the index of the system turn holding the
    /// answer.
    ///
    /// A failing answer service does not make this return an error: the
    /// failure is recorded as a system turn with `Failed` status.
    #[instrument(skip(self, query), fields(session = %self.id))]
    pub async fn submit(&self, query: &str) -> Result<usize> {
        if query.trim().is_empty() {
            return Err(CompassError::EmptyQuery);
        }

        let question = self.store.lock().await.append(Turn::user(query));
        let _pending = PendingGuard::enter(&self.pending);
        debug!("Question stored as turn {}", question);

        let turn = match self.client.ask(query).await {
            Ok(result) => {
                debug!("Answer for turn {} cites {} sources", question, result.citations.len());
                Turn::answered(question, result)
            }
            Err(e) => {
                warn!("Answer for turn {} failed: {}", question, e);
                Turn::failed(question)
            }
        };

        let index = self.store.lock().await.append(turn);
        info!("Turn {} answered by turn {}", question, index);
        Ok(index)
    }

    /// Record a verdict on an answered turn, replacing any earlier verdict.
    #[instrument(skip(self), fields(session = %self.id))]
    pub async fn give_feedback(&self, turn_index: usize, verdict: Verdict) -> Result<()> {
        let turn = {
            let store = self.store.lock().await;
            store
                .get(turn_index)
                .map_err(|_| CompassError::invalid_turn(turn_index, "no such turn"))?
                .clone()
        };

        self.ledger.lock().await.record(&turn, verdict)?;
        Ok(())
    }

    pub async fn feedback(&self, turn_index: usize) -> Option<Verdict> {
        self.ledger.lock().await.get(turn_index)
    }

    pub async fn history(&self) -> History {
        self.store.lock().await.all()
    }

    pub async fn turn(&self, index: usize) -> Result<Turn> {
        self.store.lock().await.get(index).cloned()
    }

    pub async fn summary(&self) -> SessionSummary {
        let history = self.history().await;
        let ledger = self.ledger.lock().await;
        SessionSummary::collect(&history, &ledger, self.pending.load(Ordering::SeqCst))
    }

    pub async fn transcript(&self) -> Transcript {
        let history = self.history().await;
        let ledger = self.ledger.lock().await;
        Transcript::new(self.id, &history, &ledger, self.pending.load(Ordering::SeqCst))
    }
}

/// Counts an outstanding submission for as long as it is alive.
struct PendingGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> PendingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}
