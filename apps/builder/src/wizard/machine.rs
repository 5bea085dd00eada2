#![allow(dead_code)]

//! Wizard state machine.
//!
//! One state per step index. Field edits are always accepted, `advance` is
//! gated by the current step's predicate, `retreat` never re-validates, and
//! `submit` is only legal from the final step with no submission in flight.
//!
//! Submission is split into `begin_submit` / `complete_submit` /
//! `fail_submit` so a caller holding the wizard behind a lock can release it
//! across the network call. `submit` runs all three for single-owner callers.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::delivery::{deliver_quietly, suggested_filename, ArtifactDelivery};
use crate::generation_client::{GenerationFailed, ResumeGenerator};
use crate::models::resume::ResumeData;
use crate::models::user::SessionContext;
use crate::wizard::fields::{FieldEdit, FieldKey, RawFormFields};
use crate::wizard::normalizer::{normalize, Normalized};
use crate::wizard::validation::missing_required;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Personal,
    Education,
    Experience,
    SkillsAndTemplate,
    /// Every field on one page.
    Details,
}

impl Step {
    pub fn title(&self) -> &'static str {
        match self {
            Step::Personal => "Personal Details",
            Step::Education => "Education Background",
            Step::Experience => "Experience & Projects",
            Step::SkillsAndTemplate => "Skills & Template",
            Step::Details => "Resume Details",
        }
    }

    /// Required fields this step checks before the wizard may move past it.
    fn gates_identity(&self) -> bool {
        matches!(self, Step::Personal | Step::Details)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardLayout {
    #[default]
    MultiStep,
    SinglePage,
}

const MULTI_STEP: [Step; 4] = [
    Step::Personal,
    Step::Education,
    Step::Experience,
    Step::SkillsAndTemplate,
];
const SINGLE_PAGE: [Step; 1] = [Step::Details];

impl WizardLayout {
    pub fn steps(&self) -> &'static [Step] {
        match self {
            WizardLayout::MultiStep => &MULTI_STEP,
            WizardLayout::SinglePage => &SINGLE_PAGE,
        }
    }
}

impl FromStr for WizardLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multi_step" | "multi-step" | "multistep" => Ok(WizardLayout::MultiStep),
            "single_page" | "single-page" | "singlepage" => Ok(WizardLayout::SinglePage),
            other => Err(format!("unknown wizard layout '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Step {step} is missing required fields: {}", join_keys(.missing))]
    ValidationBlocked { step: usize, missing: Vec<FieldKey> },

    #[error("Cannot move {direction} from step {step}")]
    AtBoundary { step: usize, direction: &'static str },

    #[error("Step {step} does not exist (wizard has {count} steps)")]
    UnknownStep { step: usize, count: usize },

    #[error("Submission is only possible from the final step (currently on step {step})")]
    NotFinalStep { step: usize },

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("The wizard has completed; reset it to start a new resume")]
    Completed,

    #[error("{0}")]
    GenerationFailed(String),
}

fn join_keys(keys: &[FieldKey]) -> String {
    keys.iter().map(FieldKey::as_str).collect::<Vec<_>>().join(", ")
}

/// What a successful submission produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    pub filename: String,
    pub bytes: usize,
    /// `None` when the local save could not be confirmed.
    pub saved_to: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WizardSnapshot {
    pub layout: WizardLayout,
    pub current_step: usize,
    pub step_count: usize,
    pub step: Step,
    pub step_title: &'static str,
    pub progress: f64,
    pub fields: RawFormFields,
    pub is_submitting: bool,
    pub completed: Option<SubmitOutcome>,
    pub last_error: Option<String>,
    pub preview: Normalized,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    layout: WizardLayout,
    current_step: usize,
    fields: RawFormFields,
    is_submitting: bool,
    completed: Option<SubmitOutcome>,
    last_error: Option<String>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(WizardLayout::default())
    }
}

impl Wizard {
    pub fn new(layout: WizardLayout) -> Self {
        Self {
            layout,
            current_step: 0,
            fields: RawFormFields::default(),
            is_submitting: false,
            completed: None,
            last_error: None,
        }
    }

    pub fn layout(&self) -> WizardLayout {
        self.layout
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn step(&self) -> Step {
        self.layout.steps()[self.current_step]
    }

    pub fn step_count(&self) -> usize {
        self.layout.steps().len()
    }

    pub fn fields(&self) -> &RawFormFields {
        &self.fields
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn is_completed(&self) -> bool {
        self.completed.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn is_final_step(&self) -> bool {
        self.current_step + 1 == self.step_count()
    }

    /// Fraction of the way through the steps, 0.0 on the first.
    pub fn progress(&self) -> f64 {
        let last = self.step_count().saturating_sub(1);
        if last == 0 {
            0.0
        } else {
            self.current_step as f64 / last as f64
        }
    }

    fn ensure_open(&self) -> Result<(), WizardError> {
        if self.is_completed() {
            return Err(WizardError::Completed);
        }
        Ok(())
    }

    pub fn edit_field(&mut self, step: usize, edit: FieldEdit) -> Result<(), WizardError> {
        self.ensure_open()?;
        if step >= self.step_count() {
            return Err(WizardError::UnknownStep {
                step,
                count: self.step_count(),
            });
        }
        debug!("Edit field '{}' on step {}", edit.key().as_str(), step);
        self.fields.apply(edit);
        Ok(())
    }

    /// Missing required fields for the current step; empty when it may be left.
    pub fn blocking_fields(&self) -> Vec<FieldKey> {
        if self.step().gates_identity() {
            missing_required(&self.fields)
        } else {
            Vec::new()
        }
    }

    pub fn advance(&mut self) -> Result<usize, WizardError> {
        self.ensure_open()?;
        if self.is_final_step() {
            return Err(WizardError::AtBoundary {
                step: self.current_step,
                direction: "forward",
            });
        }
        let missing = self.blocking_fields();
        if !missing.is_empty() {
            debug!("Advance from step {} blocked", self.current_step);
            return Err(WizardError::ValidationBlocked {
                step: self.current_step,
                missing,
            });
        }
        self.current_step += 1;
        debug!("Advanced to step {}", self.current_step);
        Ok(self.current_step)
    }

    pub fn retreat(&mut self) -> Result<usize, WizardError> {
        self.ensure_open()?;
        if self.current_step == 0 {
            return Err(WizardError::AtBoundary {
                step: 0,
                direction: "back",
            });
        }
        self.current_step -= 1;
        debug!("Retreated to step {}", self.current_step);
        Ok(self.current_step)
    }

    /// Marks a submission as in flight and returns the snapshot to send.
    /// The returned data shares nothing with the wizard's fields.
    pub fn begin_submit(&mut self) -> Result<ResumeData, WizardError> {
        self.ensure_open()?;
        if self.is_submitting {
            warn!("Duplicate submission rejected");
            return Err(WizardError::SubmissionInFlight);
        }
        if !self.is_final_step() {
            return Err(WizardError::NotFinalStep {
                step: self.current_step,
            });
        }

        let normalized = normalize(&self.fields);
        if !normalized.submittable {
            return Err(WizardError::ValidationBlocked {
                step: self.current_step,
                missing: missing_required(&self.fields),
            });
        }

        self.is_submitting = true;
        self.last_error = None;
        Ok(normalized.data)
    }

    pub fn complete_submit(&mut self, outcome: SubmitOutcome) {
        self.is_submitting = false;
        self.last_error = None;
        self.completed = Some(outcome);
    }

    /// Returns to the final step with every field intact and the error attached.
    pub fn fail_submit(&mut self, failure: &GenerationFailed) -> WizardError {
        self.is_submitting = false;
        self.current_step = self.step_count() - 1;
        self.last_error = Some(failure.to_string());
        WizardError::GenerationFailed(failure.to_string())
    }

    pub async fn submit(
        &mut self,
        generator: &dyn ResumeGenerator,
        delivery: &dyn ArtifactDelivery,
        ctx: &SessionContext,
    ) -> Result<SubmitOutcome, WizardError> {
        let data = self.begin_submit()?;
        let result = run_generation(&data, generator, delivery, ctx).await;
        self.finish_submit(result)
    }

    /// Applies the result of an in-flight submission. Always clears the
    /// in-flight flag.
    pub fn finish_submit(
        &mut self,
        result: Result<SubmitOutcome, GenerationFailed>,
    ) -> Result<SubmitOutcome, WizardError> {
        match result {
            Ok(outcome) => {
                self.complete_submit(outcome.clone());
                Ok(outcome)
            }
            Err(failure) => Err(self.fail_submit(&failure)),
        }
    }

    /// Fresh state with the same layout. Refused while a submission is in flight.
    pub fn reset(&mut self) -> Result<(), WizardError> {
        if self.is_submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        *self = Wizard::new(self.layout);
        Ok(())
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        let step = self.step();
        WizardSnapshot {
            layout: self.layout,
            current_step: self.current_step,
            step_count: self.step_count(),
            step,
            step_title: step.title(),
            progress: self.progress(),
            fields: self.fields.clone(),
            is_submitting: self.is_submitting,
            completed: self.completed.clone(),
            last_error: self.last_error.clone(),
            preview: normalize(&self.fields),
        }
    }
}

/// Generation followed by delivery. Only generation can fail the submission;
/// delivery problems are logged and reported as an unconfirmed save.
pub async fn run_generation(
    data: &ResumeData,
    generator: &dyn ResumeGenerator,
    delivery: &dyn ArtifactDelivery,
    ctx: &SessionContext,
) -> Result<SubmitOutcome, GenerationFailed> {
    info!(
        "Submitting resume for generation (template: {}, user: {})",
        data.template,
        ctx.current_user
            .as_ref()
            .map(|u| format!("{} ({})", u.display_name, u.id))
            .unwrap_or_else(|| "anonymous".to_string())
    );

    let artifact = generator.generate(data, ctx).await.map_err(|e| {
        warn!("Generation failed: {e}");
        e
    })?;

    let bytes = artifact.len();
    let filename = suggested_filename(data);
    info!("Generated artifact of {bytes} bytes, delivering as {filename}");

    let saved_to = deliver_quietly(delivery, artifact, &filename).await;

    Ok(SubmitOutcome {
        filename,
        bytes,
        saved_to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{network_down, pdf, FakeGenerator, RecordingDelivery};
    use crate::wizard::fields::SectionInput;

    fn filled_wizard() -> Wizard {
        let mut w = Wizard::new(WizardLayout::MultiStep);
        w.edit_field(0, FieldEdit::Name("Asha Rao".to_string())).unwrap();
        w.edit_field(0, FieldEdit::Email("asha@example.com".to_string())).unwrap();
        w.edit_field(0, FieldEdit::Phone(String::new())).unwrap();
        w.edit_field(1, FieldEdit::Education(SectionInput::Text("B.Tech, VIPS".to_string())))
            .unwrap();
        w.edit_field(
            3,
            FieldEdit::Skills(SectionInput::Text("React, Node.js, , SQL".to_string())),
        )
        .unwrap();
        w
    }

    fn at_final_step(mut w: Wizard) -> Wizard {
        while w.advance().is_ok() {}
        assert_eq!(w.current_step(), w.step_count() - 1);
        w
    }

    #[test]
    fn test_initial_state() {
        let w = Wizard::default();
        assert_eq!(w.current_step(), 0);
        assert_eq!(w.step_count(), 4);
        assert_eq!(w.step(), Step::Personal);
        assert!(!w.is_submitting());
        assert!(!w.is_completed());
        assert_eq!(w.fields(), &RawFormFields::default());
    }

    #[test]
    fn test_advance_blocked_without_identity() {
        let mut w = Wizard::default();
        w.edit_field(0, FieldEdit::Name("Asha".to_string())).unwrap();

        let err = w.advance().unwrap_err();
        assert_eq!(
            err,
            WizardError::ValidationBlocked {
                step: 0,
                missing: vec![FieldKey::Email]
            }
        );
        assert_eq!(w.current_step(), 0);
    }

    #[test]
    fn test_advance_moves_one_step_when_valid() {
        let mut w = filled_wizard();
        assert_eq!(w.advance().unwrap(), 1);
        // Later steps have no required fields.
        assert_eq!(w.advance().unwrap(), 2);
        assert_eq!(w.advance().unwrap(), 3);
        assert!(matches!(w.advance(), Err(WizardError::AtBoundary { step: 3, .. })));
        assert_eq!(w.current_step(), 3);
    }

    #[test]
    fn test_retreat_never_validates() {
        let mut w = at_final_step(filled_wizard());
        w.edit_field(0, FieldEdit::Name(String::new())).unwrap();
        assert_eq!(w.retreat().unwrap(), 2);
        assert_eq!(w.retreat().unwrap(), 1);
        assert_eq!(w.retreat().unwrap(), 0);
        assert!(matches!(w.retreat(), Err(WizardError::AtBoundary { step: 0, .. })));
    }

    #[test]
    fn test_retreat_then_advance_restores_step_and_fields() {
        let mut w = filled_wizard();
        w.advance().unwrap();
        w.advance().unwrap();
        let before_fields = w.fields().clone();
        let before_step = w.current_step();

        w.retreat().unwrap();
        w.advance().unwrap();

        assert_eq!(w.current_step(), before_step);
        assert_eq!(w.fields(), &before_fields);
    }

    #[test]
    fn test_edit_does_not_change_step() {
        let mut w = filled_wizard();
        w.advance().unwrap();
        w.edit_field(3, FieldEdit::Template("modern".to_string())).unwrap();
        assert_eq!(w.current_step(), 1);
        assert_eq!(w.fields().template, "modern");
    }

    #[test]
    fn test_edit_unknown_step_rejected() {
        let mut w = Wizard::new(WizardLayout::SinglePage);
        assert_eq!(
            w.edit_field(1, FieldEdit::Name("x".to_string())),
            Err(WizardError::UnknownStep { step: 1, count: 1 })
        );
    }

    #[test]
    fn test_submit_requires_final_step() {
        let mut w = filled_wizard();
        assert_eq!(w.begin_submit(), Err(WizardError::NotFinalStep { step: 0 }));
        assert!(!w.is_submitting());
    }

    #[tokio::test]
    async fn test_submit_without_identity_never_calls_generator() {
        let mut w = Wizard::new(WizardLayout::SinglePage);
        w.edit_field(0, FieldEdit::Name("Asha Rao".to_string())).unwrap();
        let generator = FakeGenerator::new(vec![pdf()]);
        let delivery = RecordingDelivery::default();

        let err = w
            .submit(&generator, &delivery, &SessionContext::default())
            .await
            .unwrap_err();

        assert!(matches!(err, WizardError::ValidationBlocked { .. }));
        assert_eq!(generator.calls(), 0);
        assert!(!w.is_submitting());
    }

    #[tokio::test]
    async fn test_successful_submit_delivers_named_file() {
        let mut w = at_final_step(filled_wizard());
        let generator = FakeGenerator::new(vec![pdf()]);
        let delivery = RecordingDelivery::default();

        let outcome = w
            .submit(&generator, &delivery, &SessionContext::default())
            .await
            .unwrap();

        assert_eq!(outcome.filename, "Asha_Rao_Resume.pdf");
        assert_eq!(outcome.bytes, b"%PDF-1.7 generated".len());
        assert_eq!(
            *delivery.names.lock().unwrap(),
            vec!["Asha_Rao_Resume.pdf".to_string()]
        );
        assert!(w.is_completed());
        assert!(!w.is_submitting());

        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests[0].skills, vec!["React", "Node.js", "SQL"]);
        assert_eq!(requests[0].education.len(), 1);
    }

    #[tokio::test]
    async fn test_completed_wizard_refuses_transitions_until_reset() {
        let mut w = at_final_step(filled_wizard());
        let generator = FakeGenerator::new(vec![pdf()]);
        w.submit(&generator, &RecordingDelivery::default(), &SessionContext::default())
            .await
            .unwrap();

        assert_eq!(w.retreat(), Err(WizardError::Completed));
        assert_eq!(w.begin_submit(), Err(WizardError::Completed));

        w.reset().unwrap();
        assert_eq!(w.current_step(), 0);
        assert!(!w.is_completed());
        assert_eq!(w.fields(), &RawFormFields::default());
    }

    #[tokio::test]
    async fn test_failed_submit_preserves_fields_and_allows_retry() {
        let mut w = at_final_step(filled_wizard());
        let before = w.fields().clone();
        let generator = FakeGenerator::new(vec![network_down(), pdf()]);
        let delivery = RecordingDelivery::default();
        let ctx = SessionContext::default();

        let err = w.submit(&generator, &delivery, &ctx).await.unwrap_err();
        assert!(matches!(err, WizardError::GenerationFailed(ref m) if m.contains("connection refused")));
        assert!(!w.is_submitting());
        assert_eq!(w.fields(), &before);
        assert_eq!(w.current_step(), 3);
        assert!(w.last_error().is_some());
        assert!(delivery.names.lock().unwrap().is_empty());

        w.submit(&generator, &delivery, &ctx).await.unwrap();
        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], requests[1]);
        assert!(w.last_error().is_none());
    }

    #[test]
    fn test_duplicate_submit_rejected_while_in_flight() {
        let mut w = at_final_step(filled_wizard());
        w.begin_submit().unwrap();
        assert_eq!(w.begin_submit(), Err(WizardError::SubmissionInFlight));
        assert_eq!(w.reset(), Err(WizardError::SubmissionInFlight));
    }

    #[test]
    fn test_edits_and_retreat_allowed_while_in_flight() {
        let mut w = at_final_step(filled_wizard());
        w.begin_submit().unwrap();

        w.edit_field(0, FieldEdit::Phone("+91 98765".to_string())).unwrap();
        assert_eq!(w.retreat().unwrap(), 2);
        assert!(w.is_submitting());

        // Failure brings the user back to the final step.
        w.fail_submit(&GenerationFailed::new(Some(502), "bad gateway"));
        assert_eq!(w.current_step(), 3);
        assert_eq!(w.fields().phone, "+91 98765");
        assert!(!w.is_submitting());
    }

    #[test]
    fn test_begin_submit_snapshot_is_detached() {
        let mut w = at_final_step(filled_wizard());
        let data = w.begin_submit().unwrap();
        w.edit_field(0, FieldEdit::Name("Someone Else".to_string())).unwrap();
        assert_eq!(data.person.name, "Asha Rao");
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_fail_submission() {
        let mut w = at_final_step(filled_wizard());
        let generator = FakeGenerator::new(vec![pdf()]);
        let delivery = RecordingDelivery::failing();

        let outcome = w
            .submit(&generator, &delivery, &SessionContext::default())
            .await
            .unwrap();
        assert!(outcome.saved_to.is_none());
        assert!(w.is_completed());
    }

    #[test]
    fn test_single_page_layout() {
        let mut w = Wizard::new(WizardLayout::SinglePage);
        assert_eq!(w.step_count(), 1);
        assert_eq!(w.step().title(), "Resume Details");
        assert_eq!(w.progress(), 0.0);
        assert!(matches!(w.advance(), Err(WizardError::AtBoundary { .. })));

        w.edit_field(0, FieldEdit::Name("Asha".to_string())).unwrap();
        w.edit_field(0, FieldEdit::Email("asha@example.com".to_string())).unwrap();
        assert!(w.begin_submit().is_ok());
    }

    #[test]
    fn test_progress_tracks_steps() {
        let mut w = filled_wizard();
        assert_eq!(w.progress(), 0.0);
        w.advance().unwrap();
        assert!((w.progress() - 1.0 / 3.0).abs() < f64::EPSILON);
        let w = at_final_step(w);
        assert_eq!(w.progress(), 1.0);
    }

    #[test]
    fn test_layout_parse() {
        assert_eq!("single_page".parse::<WizardLayout>().unwrap(), WizardLayout::SinglePage);
        assert_eq!("Multi-Step".parse::<WizardLayout>().unwrap(), WizardLayout::MultiStep);
        assert!("wizard".parse::<WizardLayout>().is_err());
    }

    #[test]
    fn test_validation_blocked_message_names_fields() {
        let err = WizardError::ValidationBlocked {
            step: 0,
            missing: vec![FieldKey::Name, FieldKey::Email],
        };
        assert_eq!(err.to_string(), "Step 0 is missing required fields: name, email");
    }
}
