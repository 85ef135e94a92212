pub mod store;
pub mod feedback;
pub mod transcript;

pub use store::{ConversationStore, History};
pub use feedback::{FeedbackLedger, FeedbackTally};
pub use transcript::{SessionSummary, Transcript};
