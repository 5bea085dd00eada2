//! Folds raw wizard input into the canonical `ResumeData`.
//!
//! Normalization never fails. Missing or malformed optional input degrades to
//! empty strings and sequences; missing name or email only clears the
//! `submittable` flag on the result.

use serde::Serialize;

use crate::models::resume::{EducationEntry, ExperienceEntry, PersonalInfo, ResumeData, TemplateId};
use crate::wizard::fields::{RawFormFields, SectionInput};
use crate::wizard::validation::{collect_issues, FieldIssue};

#[derive(Debug, Clone, Serialize)]
pub struct Normalized {
    pub data: ResumeData,
    pub submittable: bool,
    pub issues: Vec<FieldIssue>,
}

pub fn normalize(raw: &RawFormFields) -> Normalized {
    let phone = raw.phone.trim();
    let data = ResumeData {
        person: PersonalInfo {
            name: raw.name.trim().to_string(),
            email: raw.email.trim().to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
        },
        education: normalize_education(&raw.education),
        skills: normalize_skills(&raw.skills),
        experience: normalize_experience(&raw.experience),
        template: raw.template.parse().unwrap_or_default(),
    };

    Normalized {
        submittable: data.is_submittable(),
        issues: collect_issues(raw),
        data,
    }
}

/// Splits comma-separated skills, trimming each and dropping empty segments.
/// Duplicates are kept in the order given.
pub fn split_skills(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_skills(input: &SectionInput<String>) -> Vec<String> {
    match input {
        SectionInput::Text(text) => split_skills(text),
        SectionInput::Entries(items) => items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

/// A free-text block becomes one opaque entry carrying the whole block.
fn text_block(text: &str) -> Option<String> {
    let block = text.trim();
    (!block.is_empty()).then(|| block.to_string())
}

fn normalize_education(input: &SectionInput<EducationEntry>) -> Vec<EducationEntry> {
    match input {
        SectionInput::Text(text) => text_block(text)
            .map(|degree| EducationEntry {
                degree,
                ..Default::default()
            })
            .into_iter()
            .collect(),
        SectionInput::Entries(entries) => entries
            .iter()
            .map(|e| EducationEntry {
                degree: e.degree.trim().to_string(),
                institution: e.institution.trim().to_string(),
                year: e.year.trim().to_string(),
            })
            .collect(),
    }
}

fn normalize_experience(input: &SectionInput<ExperienceEntry>) -> Vec<ExperienceEntry> {
    match input {
        SectionInput::Text(text) => text_block(text)
            .map(|details| ExperienceEntry {
                details,
                ..Default::default()
            })
            .into_iter()
            .collect(),
        SectionInput::Entries(entries) => entries
            .iter()
            .map(|e| ExperienceEntry {
                role: e.role.trim().to_string(),
                company: e.company.trim().to_string(),
                years: e.years.trim().to_string(),
                details: e.details.trim().to_string(),
            })
            .collect(),
    }
}
