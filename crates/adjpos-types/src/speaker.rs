use std::fmt;

use crate::Age;

/// Age in years from which a speaker with a known age counts as an adult.
pub const ADULT_AGE: f64 = 18.0;

const CHILD_ROLES: &[&str] = &[
    "target_child",
    "child",
    "sibling",
    "brother",
    "sister",
    "boy",
    "girl",
];
const SIBLING_ROLES: &[&str] = &["sibling", "brother", "sister"];

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    /// Accepts `male`/`female` and the `M`/`F` shorthand of transcript headers.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Sex::Male,
            "female" | "f" => Sex::Female,
            _ => Sex::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw speaker fields as read from a participant table.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeakerFields {
    pub id: String,
    pub role: String,
    pub name: String,
    pub sex: Sex,
    pub age: Option<Age>,
    pub language: String,
}

/// Identity and demographics of whoever uttered a sentence.
///
/// The adult and sibling classifications are fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeakerProfile {
    fields: SpeakerFields,
    is_adult: bool,
    is_sibling: bool,
}

impl SpeakerProfile {
    /// Classify from the age when known, otherwise from the role.
    pub fn new(fields: SpeakerFields) -> Self {
        let is_adult = match &fields.age {
            Some(age) => age.decimal >= ADULT_AGE,
            None => !role_in(&fields.role, CHILD_ROLES),
        };
        Self::with_classification(fields, is_adult)
    }

    /// Rebuild a profile whose adult flag was decided earlier (e.g. persisted).
    pub fn with_classification(fields: SpeakerFields, is_adult: bool) -> Self {
        let is_sibling = role_in(&fields.role, SIBLING_ROLES);
        Self {
            fields,
            is_adult,
            is_sibling,
        }
    }

    pub fn id(&self) -> &str {
        &self.fields.id
    }

    pub fn role(&self) -> &str {
        &self.fields.role
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn sex(&self) -> Sex {
        self.fields.sex
    }

    pub fn age(&self) -> Option<&Age> {
        self.fields.age.as_ref()
    }

    pub fn language(&self) -> &str {
        &self.fields.language
    }

    pub fn is_adult(&self) -> bool {
        self.is_adult
    }

    pub fn is_sibling(&self) -> bool {
        self.is_sibling
    }

    pub fn fields(&self) -> &SpeakerFields {
        &self.fields
    }
}

fn role_in(role: &str, roles: &[&str]) -> bool {
    let role = role.trim().to_ascii_lowercase();
    roles.contains(&role.as_str())
}
