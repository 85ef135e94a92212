use async_trait::async_trait;
use chrono::Utc;
use compass_core::{CompassError, Result};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::model::{NewProject, Project, RiskAssessment};

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Project>>;
    async fn get(&self, id: u64) -> Result<Project>;
    async fn insert(&self, project: NewProject, assessment: Option<RiskAssessment>) -> Result<Project>;
    async fn rename(&self, id: u64, name: &str) -> Result<Project>;
    async fn delete(&self, id: u64) -> Result<()>;
}

/// Process-local repository; ids start at 1 and are never reused.
#[derive(Default)]
pub struct InMemoryProjectRepository {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    projects: BTreeMap<u64, Project>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn list(&self) -> Result<Vec<Project>> {
        Ok(self.inner.read().await.projects.values().cloned().collect())
    }

    async fn get(&self, id: u64) -> Result<Project> {
        self.inner
            .read()
            .await
            .projects
            .get(&id)
            .cloned()
            .ok_or(CompassError::ProjectNotFound(id))
    }

    async fn insert(&self, project: NewProject, assessment: Option<RiskAssessment>) -> Result<Project> {
        project.validate()?;

        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;

        let (eu_risk, eu_risk_reason) = match assessment {
            Some(a) => (Some(a.risk), Some(a.reason)),
            None => (None, None),
        };

        let stored = Project {
            id,
            market: project.markets(),
            name: project.name,
            description: project.description,
            eu_risk,
            eu_risk_reason,
            attachment: project.attachment,
            created_date: Utc::now(),
        };
        inner.projects.insert(id, stored.clone());

        info!("Registered project {} ({})", id, stored.name);
        Ok(stored)
    }

    async fn rename(&self, id: u64, name: &str) -> Result<Project> {
        if name.trim().is_empty() {
            return Err(CompassError::ProjectError("missing required field: name".into()));
        }

        let mut inner = self.inner.write().await;
        let project = inner
            .projects
            .get_mut(&id)
            .ok_or(CompassError::ProjectNotFound(id))?;
        project.name = name.to_string();

        debug!("Renamed project {}", id);
        Ok(project.clone())
    }

    async fn delete(&self, id: u64) -> Result<()> {
        self.inner
            .write()
            .await
            .projects
            .remove(&id)
            .map(|_| info!("Deleted project {}", id))
            .ok_or(CompassError::ProjectNotFound(id))
    }
}
