use async_trait::async_trait;
use compass_core::Result;
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::model::{NewProject, Project, RiskAssessment};
use crate::repository::ProjectRepository;

/// Opaque EU risk classifier, fed the project description.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RiskClassifier: Send + Sync {
    async fn classify(&self, description: &str) -> Result<RiskAssessment>;
}

pub struct ProjectService {
    repository: Arc<dyn ProjectRepository>,
    classifier: Arc<dyn RiskClassifier>,
}

impl ProjectService {
    pub fn new(repository: Arc<dyn ProjectRepository>, classifier: Arc<dyn RiskClassifier>) -> Self {
        Self {
            repository,
            classifier,
        }
    }

    /// Validate, classify, then store. A classifier failure does not block
    /// registration; the project is stored without a risk level.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: NewProject) -> Result<Project> {
        input.validate()?;

        let assessment = match self.classifier.classify(&input.description).await {
            Ok(assessment) => Some(assessment),
            Err(e) => {
                warn!("Risk classification failed, storing project unclassified: {}", e);
                None
            }
        };

        self.repository.insert(input, assessment).await
    }

    pub async fn list(&self) -> Result<Vec<Project>> {
        self.repository.list().await
    }

    pub async fn get(&self, id: u64) -> Result<Project> {
        self.repository.get(id).await
    }

    pub async fn rename(&self, id: u64, name: &str) -> Result<Project> {
        self.repository.rename(id, name).await
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.repository.delete(id).await
    }
}
