//! Raw, not-yet-normalized wizard input.
//!
//! Education, experience and skills each accept two encodings: a free-text
//! block (what a textarea produces) or an already-structured list. Both are
//! folded into the canonical shape by the normalizer; nothing past it ever
//! sees `SectionInput`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::resume::{EducationEntry, ExperienceEntry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionInput<T> {
    Text(String),
    Entries(Vec<T>),
}

impl<T> Default for SectionInput<T> {
    fn default() -> Self {
        SectionInput::Text(String::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFormFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub education: SectionInput<EducationEntry>,
    pub experience: SectionInput<ExperienceEntry>,
    /// Comma-separated text, or a list when the client already split it.
    pub skills: SectionInput<String>,
    pub template: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    Name,
    Email,
    Phone,
    Education,
    Experience,
    Skills,
    Template,
}

impl FieldKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::Email => "email",
            FieldKey::Phone => "phone",
            FieldKey::Education => "education",
            FieldKey::Experience => "experience",
            FieldKey::Skills => "skills",
            FieldKey::Template => "template",
        }
    }
}

/// A single field edit. The key and the value type travel together so an
/// edit can never put a list into a text field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldEdit {
    Name(String),
    Email(String),
    Phone(String),
    Education(SectionInput<EducationEntry>),
    Experience(SectionInput<ExperienceEntry>),
    Skills(SectionInput<String>),
    Template(String),
}

impl FieldEdit {
    pub fn key(&self) -> FieldKey {
        match self {
            FieldEdit::Name(_) => FieldKey::Name,
            FieldEdit::Email(_) => FieldKey::Email,
            FieldEdit::Phone(_) => FieldKey::Phone,
            FieldEdit::Education(_) => FieldKey::Education,
            FieldEdit::Experience(_) => FieldKey::Experience,
            FieldEdit::Skills(_) => FieldKey::Skills,
            FieldEdit::Template(_) => FieldKey::Template,
        }
    }

    /// Builds an edit from a key and an untyped JSON value, checking that the
    /// value has the shape the field expects.
    pub fn from_parts(key: FieldKey, value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(json!({ "field": key, "value": value }))
    }
}

impl RawFormFields {
    pub fn apply(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::Name(v) => self.name = v,
            FieldEdit::Email(v) => self.email = v,
            FieldEdit::Phone(v) => self.phone = v,
            FieldEdit::Education(v) => self.education = v,
            FieldEdit::Experience(v) => self.experience = v,
            FieldEdit::Skills(v) => self.skills = v,
            FieldEdit::Template(v) => self.template = v,
        }
    }
}
