use compass_core::{CompassError, Result, Turn};
use std::sync::Arc;
use tracing::debug;

/// Ordered turn history for one session.
///
/// Turns live behind a shared, copy-on-write vector so that [`History`]
/// snapshots stay valid while the store keeps growing. Appending only copies
/// the vector when a snapshot is still alive.
#[derive(Debug, Default)]
pub struct ConversationStore {
    turns: Arc<Vec<Turn>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `turn` at the next contiguous index and return that index.
    pub fn append(&mut self, mut turn: Turn) -> usize {
        let index = self.turns.len();
        turn.index = index;
        Arc::make_mut(&mut self.turns).push(turn);

        debug!("Appended turn {}", index);
        index
    }

    pub fn get(&self, index: usize) -> Result<&Turn> {
        self.turns.get(index).ok_or(CompassError::NotFound(index))
    }

    /// Snapshot of every turn in append order.
    pub fn all(&self) -> History {
        History {
            turns: Arc::clone(&self.turns),
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Immutable, restartable view of a conversation at one point in time.
#[derive(Debug, Clone, Default)]
pub struct History {
    turns: Arc<Vec<Turn>>,
}

impl History {
    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Turn> {
        self.turns.as_ref().clone()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
