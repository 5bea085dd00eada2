//! Scripted stand-ins for the generation service and the local save action.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::delivery::{ArtifactDelivery, DeliveryFailed};
use crate::generation_client::{BinaryArtifact, GenerationFailed, ResumeGenerator};
use crate::models::resume::ResumeData;
use crate::models::user::SessionContext;

/// Replays queued results in order and records every request it receives.
pub struct FakeGenerator {
    results: Mutex<Vec<Result<BinaryArtifact, GenerationFailed>>>,
    pub requests: Mutex<Vec<ResumeData>>,
    pub contexts: Mutex<Vec<SessionContext>>,
}

impl FakeGenerator {
    pub fn new(mut results: Vec<Result<BinaryArtifact, GenerationFailed>>) -> Self {
        results.reverse();
        Self {
            results: Mutex::new(results),
            requests: Mutex::new(Vec::new()),
            contexts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ResumeGenerator for FakeGenerator {
    async fn generate(
        &self,
        data: &ResumeData,
        ctx: &SessionContext,
    ) -> Result<BinaryArtifact, GenerationFailed> {
        self.requests.lock().unwrap().push(data.clone());
        self.contexts.lock().unwrap().push(ctx.clone());
        self.results
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(GenerationFailed::new(None, "no scripted result")))
    }
}

#[derive(Default)]
pub struct RecordingDelivery {
    pub names: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingDelivery {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ArtifactDelivery for RecordingDelivery {
    async fn deliver(
        &self,
        _bytes: BinaryArtifact,
        suggested_name: &str,
    ) -> Result<PathBuf, DeliveryFailed> {
        self.names.lock().unwrap().push(suggested_name.to_string());
        if self.fail {
            return Err(DeliveryFailed::Aborted("save dialog dismissed".to_string()));
        }
        Ok(PathBuf::from("/downloads").join(suggested_name))
    }
}

pub fn pdf() -> Result<BinaryArtifact, GenerationFailed> {
    Ok(BinaryArtifact::from_static(b"%PDF-1.7 generated"))
}

pub fn network_down() -> Result<BinaryArtifact, GenerationFailed> {
    Err(GenerationFailed::new(None, "connection refused"))
}

/// Blocks every generation call until `release` is called once per call.
pub struct GatedGenerator {
    gate: Semaphore,
    calls: AtomicUsize,
    fail: bool,
}

impl Default for GatedGenerator {
    fn default() -> Self {
        Self {
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }
}

impl GatedGenerator {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResumeGenerator for GatedGenerator {
    async fn generate(
        &self,
        _data: &ResumeData,
        _ctx: &SessionContext,
    ) -> Result<BinaryArtifact, GenerationFailed> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| GenerationFailed::new(None, e.to_string()))?;
        if self.fail {
            return network_down();
        }
        pdf()
    }
}
