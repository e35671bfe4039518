use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use sanatio_core::{AppError, AppResult};
use serde_json::{Map, Value};

use crate::{Action, SubjectCatalog, SubjectName};

/// Mapping of subjects to the actions one role may perform on them.
///
/// Subject keys are normalized, so keys differing only in case share one
/// action set, and actions within a subject are deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    grants: BTreeMap<SubjectName, BTreeSet<Action>>,
}

/// Result of decoding a stored permission document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPermissionDocument {
    /// Grants recovered from the document.
    pub permission_set: PermissionSet,
    /// Human-readable descriptions of entries that granted nothing.
    pub ignored_entries: Vec<String>,
}

impl PermissionSet {
    /// Creates an empty permission set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one grant.
    pub fn grant(&mut self, subject: SubjectName, action: Action) {
        self.grants.entry(subject).or_default().insert(action);
    }

    /// Builds a permission set from subject/action pairs, rejecting blank subjects.
    pub fn from_grants<I, S>(grants: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (S, Vec<Action>)>,
        S: AsRef<str>,
    {
        let mut permission_set = Self::new();
        for (subject, actions) in grants {
            let subject = SubjectName::new(subject)?;
            for action in actions {
                permission_set.grant(subject.clone(), action);
            }
        }

        Ok(permission_set)
    }

    /// Builds a permission set from a transport payload.
    ///
    /// Unlike stored documents, transport input is rejected on the first
    /// unknown action or blank or padded subject.
    pub fn from_transport(grants: &BTreeMap<String, Vec<String>>) -> AppResult<Self> {
        let mut permission_set = Self::new();
        for (subject, actions) in grants {
            let subject = SubjectName::new(subject)?;
            for action in actions {
                permission_set.grant(subject.clone(), Action::from_transport(action)?);
            }
        }

        Ok(permission_set)
    }

    /// Decodes a serialized permission document read from storage.
    ///
    /// A document that is not JSON, or whose top level is neither an object
    /// nor `null`, is rejected as a whole so the caller can fail closed.
    /// Inside an object, entries with blank or padded subject keys,
    /// non-array action lists or actions outside the exact vocabulary are
    /// skipped and reported in `ignored_entries`.
    pub fn parse_document(raw: &str) -> AppResult<ParsedPermissionDocument> {
        let value = serde_json::from_str::<Value>(raw).map_err(|error| {
            AppError::Validation(format!("malformed permission document: {error}"))
        })?;

        let mut ignored_entries = Vec::new();
        let permission_set = match &value {
            Value::Null => Self::new(),
            Value::Object(entries) => Self::collect_stored(entries, &mut ignored_entries),
            other => {
                return Err(AppError::Validation(format!(
                    "permission document must be an object, found {}",
                    json_kind(other)
                )));
            }
        };

        Ok(ParsedPermissionDocument {
            permission_set,
            ignored_entries,
        })
    }

    fn collect_stored(entries: &Map<String, Value>, ignored: &mut Vec<String>) -> Self {
        let mut permission_set = Self::new();

        for (subject, actions) in entries {
            let subject_name = match SubjectName::new(subject) {
                Ok(subject_name) => subject_name,
                Err(error) => {
                    ignored.push(error.to_string());
                    continue;
                }
            };
            let Value::Array(actions) = actions else {
                ignored.push(format!(
                    "subject '{subject_name}' has a non-array action list ({})",
                    json_kind(actions)
                ));
                continue;
            };

            for action in actions {
                match action.as_str().map(Action::from_str) {
                    Some(Ok(action)) => permission_set.grant(subject_name.clone(), action),
                    _ => ignored.push(format!(
                        "subject '{subject_name}' lists unknown action {action}"
                    )),
                }
            }
        }

        permission_set
    }

    /// Serializes the set as `{ "<subject>": ["<action>", ...] }`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let entries = self
            .grants
            .iter()
            .map(|(subject, actions)| {
                let actions = actions
                    .iter()
                    .map(|action| Value::String(action.as_str().to_owned()))
                    .collect();
                (subject.as_str().to_owned(), Value::Array(actions))
            })
            .collect::<Map<_, _>>();

        Value::Object(entries)
    }

    /// Serializes the set into the stored document form.
    #[must_use]
    pub fn to_document(&self) -> String {
        self.to_json().to_string()
    }

    /// Returns whether the action is granted on the subject, ignoring subject case.
    #[must_use]
    pub fn contains(&self, subject: &str, action: Action) -> bool {
        self.actions_for(subject)
            .is_some_and(|actions| actions.contains(&action))
    }

    /// Returns the actions granted on a subject, if any.
    #[must_use]
    pub fn actions_for(&self, subject: &str) -> Option<&BTreeSet<Action>> {
        let subject = SubjectName::new(subject).ok()?;
        self.grants.get(&subject)
    }

    /// Iterates over subjects and their granted actions in subject order.
    pub fn iter(&self) -> impl Iterator<Item = (&SubjectName, &BTreeSet<Action>)> {
        self.grants.iter()
    }

    /// Returns whether the set grants nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Checks every grant against the master catalog.
    pub fn validate_against(&self, catalog: &SubjectCatalog) -> AppResult<()> {
        for (subject, actions) in &self.grants {
            let entry = catalog.find(subject.as_str()).ok_or_else(|| {
                AppError::Validation(format!("unknown permission subject '{subject}'"))
            })?;

            if let Some(action) = actions
                .iter()
                .find(|action| !entry.actions().contains(action))
            {
                return Err(AppError::Validation(format!(
                    "action '{action}' is not available for subject '{subject}'"
                )));
            }
        }

        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
