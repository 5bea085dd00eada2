#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};
use uuid::Uuid;

use crate::delivery::ArtifactDelivery;
use crate::generation_client::{GenerationFailed, ResumeGenerator};
use crate::models::user::SessionContext;
use crate::wizard::machine::{run_generation, SubmitOutcome, Wizard, WizardError, WizardLayout};

pub type SharedWizard = Arc<Mutex<Wizard>>;

/// Live wizard sessions. Each session owns its own `Wizard`; nothing is
/// shared between them and nothing outlives the process.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedWizard>>>,
}

impl SessionStore {
    pub async fn create(&self, layout: WizardLayout) -> (Uuid, SharedWizard) {
        let id = Uuid::new_v4();
        let wizard = Arc::new(Mutex::new(Wizard::new(layout)));
        self.sessions.write().await.insert(id, wizard.clone());
        info!("Mounted wizard session {id} ({layout:?})");
        (id, wizard)
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedWizard> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Discards a session. An in-flight submission keeps its own handle and
    /// finishes against the detached wizard; its result is never observed.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!("Unmounted wizard session {id}");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Submits a shared wizard without holding its lock across the network call.
///
/// Generation and the final state transition run on their own task, which
/// owns a handle to the wizard. Dropping the returned future (a disconnected
/// client) only stops waiting for the result; the task still clears the
/// in-flight flag when generation ends.
pub async fn submit_shared(
    wizard: SharedWizard,
    generator: Arc<dyn ResumeGenerator>,
    delivery: Arc<dyn ArtifactDelivery>,
    ctx: SessionContext,
) -> Result<SubmitOutcome, WizardError> {
    let data = wizard.lock().await.begin_submit()?;

    let task_wizard = wizard.clone();
    let task = tokio::spawn(async move {
        let result = run_generation(&data, generator.as_ref(), delivery.as_ref(), &ctx).await;
        task_wizard.lock().await.finish_submit(result)
    });

    match task.await {
        Ok(result) => result,
        Err(e) => {
            error!("Submission task aborted: {e}");
            let failure = GenerationFailed::new(None, format!("submission task aborted: {e}"));
            let mut wizard = wizard.lock().await;
            Err(wizard.fail_submit(&failure))
        }
    }
}
