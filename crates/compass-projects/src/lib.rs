//! Project registry: governance projects annotated with an EU AI Act risk tier.
//!
//! Risk classification is an external concern reached through
//! [`RiskClassifier`]; this crate only validates, stores, and serves projects.

pub mod model;
pub mod repository;
pub mod service;

pub use model::{NewProject, Project, RiskAssessment, RiskLevel};
pub use repository::{InMemoryProjectRepository, ProjectRepository};
pub use service::{ProjectService, RiskClassifier};
