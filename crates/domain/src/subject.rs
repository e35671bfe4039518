use std::collections::{BTreeSet, HashSet};
use std::fmt::{Display, Formatter};

use sanatio_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{Action, PermissionSet};

/// Normalized name of a protectable resource category.
///
/// Names are lower-cased on construction, so two names that differ only in
/// case compare equal. Surrounding whitespace is rejected, not trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectName(String);

impl SubjectName {
    /// Creates a normalized subject name.
    pub fn new(value: impl AsRef<str>) -> AppResult<Self> {
        let value = value.as_ref();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "subject name must not be empty".to_owned(),
            ));
        }
        if value.trim() != value {
            return Err(AppError::Validation(format!(
                "subject name '{value}' must not have surrounding whitespace"
            )));
        }

        let normalized = value.to_lowercase();
        if normalized.contains('/') {
            return Err(AppError::Validation(format!(
                "subject name '{normalized}' must not contain '/'"
            )));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized subject name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for SubjectName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubjectName> for String {
    fn from(value: SubjectName) -> Self {
        value.0
    }
}

impl Display for SubjectName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One subject of the master catalog together with the actions it supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    subject: SubjectName,
    actions: BTreeSet<Action>,
}

impl CatalogEntry {
    /// Creates a catalog entry; the action list must not be empty.
    pub fn new(subject: SubjectName, actions: &[Action]) -> AppResult<Self> {
        if actions.is_empty() {
            return Err(AppError::Validation(format!(
                "catalog subject '{subject}' must support at least one action"
            )));
        }

        Ok(Self {
            subject,
            actions: actions.iter().copied().collect(),
        })
    }

    /// Returns the catalog subject.
    #[must_use]
    pub fn subject(&self) -> &SubjectName {
        &self.subject
    }

    /// Returns the actions this subject supports.
    #[must_use]
    pub fn actions(&self) -> &BTreeSet<Action> {
        &self.actions
    }
}

const FULL: &[Action] = &[Action::Create, Action::Read, Action::Update, Action::Delete];
const READ_ONLY: &[Action] = &[Action::Read];

const HOSPITAL_SUBJECTS: &[(&str, &[Action])] = &[
    ("patient", FULL),
    ("appointment", FULL),
    ("prescription", FULL),
    ("billing", FULL),
    ("pharmacy", FULL),
    ("pathology", FULL),
    ("radiology", FULL),
    ("bed", FULL),
    ("ward", FULL),
    ("staff", FULL),
    ("role", FULL),
    ("settings", FULL),
    ("hospitalcharge", FULL),
    ("chargetype", FULL),
    ("department", FULL),
    ("inventory", FULL),
    ("dashboard", READ_ONLY),
    ("report", READ_ONLY),
];

/// System-owned vocabulary of subjects that permission sets may reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectCatalog {
    entries: Vec<CatalogEntry>,
}

impl SubjectCatalog {
    /// Creates a catalog, rejecting duplicate subjects.
    pub fn new(entries: Vec<CatalogEntry>) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.subject.clone()) {
                return Err(AppError::Validation(format!(
                    "catalog subject '{}' is declared more than once",
                    entry.subject
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Returns the catalog shipped with the hospital application.
    #[must_use]
    pub fn hospital_default() -> Self {
        let entries = HOSPITAL_SUBJECTS
            .iter()
            .filter_map(|(name, actions)| {
                SubjectName::new(name)
                    .and_then(|subject| CatalogEntry::new(subject, actions))
                    .ok()
            })
            .collect();

        Self { entries }
    }

    /// Returns every catalog entry in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Finds a catalog entry by subject name, ignoring case.
    #[must_use]
    pub fn find(&self, subject: &str) -> Option<&CatalogEntry> {
        let subject = SubjectName::new(subject).ok()?;
        self.entries.iter().find(|entry| entry.subject == subject)
    }

    /// Returns whether the catalog declares the subject.
    #[must_use]
    pub fn contains(&self, subject: &str) -> bool {
        self.find(subject).is_some()
    }

    /// Returns whether the catalog allows the action on the subject.
    #[must_use]
    pub fn allows(&self, subject: &str, action: Action) -> bool {
        self.find(subject)
            .is_some_and(|entry| entry.actions.contains(&action))
    }

    /// Builds the permission set granting every catalog action on every subject.
    #[must_use]
    pub fn full_permission_set(&self) -> PermissionSet {
        let mut permission_set = PermissionSet::new();
        for entry in &self.entries {
            for action in &entry.actions {
                permission_set.grant(entry.subject.clone(), *action);
            }
        }

        permission_set
    }
}
