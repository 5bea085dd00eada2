use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::resume::TemplateId;
use crate::wizard::fields::{FieldKey, RawFormFields};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    /// Generation is refused until this is fixed.
    Blocking,
    /// Shown to the user, never gates a transition.
    Advisory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: FieldKey,
    pub severity: IssueSeverity,
    pub message: String,
}

impl FieldIssue {
    fn blocking(field: FieldKey, message: impl Into<String>) -> Self {
        Self {
            field,
            severity: IssueSeverity::Blocking,
            message: message.into(),
        }
    }

    fn advisory(field: FieldKey, message: impl Into<String>) -> Self {
        Self {
            field,
            severity: IssueSeverity::Advisory,
            message: message.into(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == IssueSeverity::Blocking
    }
}

pub fn looks_like_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email.trim())
}

/// Required personal fields that are still empty, in display order.
pub fn missing_required(fields: &RawFormFields) -> Vec<FieldKey> {
    let mut missing = Vec::new();
    if fields.name.trim().is_empty() {
        missing.push(FieldKey::Name);
    }
    if fields.email.trim().is_empty() {
        missing.push(FieldKey::Email);
    }
    missing
}

/// Every issue the current input would raise at submission time.
pub fn collect_issues(fields: &RawFormFields) -> Vec<FieldIssue> {
    let mut issues: Vec<FieldIssue> = missing_required(fields)
        .into_iter()
        .map(|key| FieldIssue::blocking(key, format!("{} is required", key.as_str())))
        .collect();

    let email = fields.email.trim();
    if !email.is_empty() && !looks_like_email(email) {
        issues.push(FieldIssue::advisory(
            FieldKey::Email,
            format!("'{email}' does not look like an email address"),
        ));
    }

    let template = fields.template.trim();
    if !template.is_empty() && template.parse::<TemplateId>().is_err() {
        issues.push(FieldIssue::advisory(
            FieldKey::Template,
            format!("Unknown template '{template}', the classic template will be used"),
        ));
    }

    issues
}
