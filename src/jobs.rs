use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::assembler::MeditationAudio;

/// Terminal and in-flight states of one generation job.
#[derive(Debug, Clone)]
pub enum JobStatus {
    Running,
    Completed(Arc<MeditationAudio>),
    Failed { detail: String },
}

/// Per-run result slots keyed by job id. Each request gets its own entry,
/// so concurrent runs can never clobber each other's results.
#[derive(Debug, Clone, Default)]
pub struct JobStore {
    inner: Arc<RwLock<HashMap<Uuid, JobStatus>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.write().await.insert(id, JobStatus::Running);
        id
    }

    pub async fn complete(&self, id: Uuid, audio: MeditationAudio) {
        self.inner
            .write()
            .await
            .insert(id, JobStatus::Completed(Arc::new(audio)));
    }

    pub async fn fail(&self, id: Uuid, detail: String) {
        self.inner
            .write()
            .await
            .insert(id, JobStatus::Failed { detail });
    }

    pub async fn get(&self, id: Uuid) -> Option<JobStatus> {
        self.inner.read().await.get(&id).cloned()
    }
}
