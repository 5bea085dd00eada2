use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity block of a resume. Only edited on the personal step of the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub years: String,
    #[serde(default)]
    pub details: String,
}

/// Layout selector forwarded to the generation service. No rendering happens here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Classic,
    Modern,
    Creative,
}

impl TemplateId {
    pub const ALL: [TemplateId; 3] = [TemplateId::Classic, TemplateId::Modern, TemplateId::Creative];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Classic => "classic",
            TemplateId::Modern => "modern",
            TemplateId::Creative => "creative",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TemplateId::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown template '{wanted}'"))
    }
}

/// Canonical resume document, the only shape the generation service accepts.
///
/// Serialized flat (`name`, `email`, `phone` at the top level next to the
/// sections) because that is the body the service reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeData {
    #[serde(flatten)]
    pub person: PersonalInfo,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub template: TemplateId,
}

impl ResumeData {
    /// Name and email are the only fields generation cannot do without.
    pub fn is_submittable(&self) -> bool {
        !self.person.name.trim().is_empty() && !self.person.email.trim().is_empty()
    }
}
