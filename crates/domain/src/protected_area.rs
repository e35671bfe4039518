use std::collections::BTreeMap;

use sanatio_core::{AppError, AppResult};

use crate::{Ability, Action, SubjectCatalog, SubjectName};

/// Outcome of checking a request path against an ability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathDecision {
    /// The path lies outside the protected area.
    Unprotected,
    /// Every derived subject grants `read`, or the path is the area root.
    Allow,
    /// The first derived subject lacking `read`.
    Deny {
        /// Subject that failed the check.
        subject: String,
    },
}

/// Path prefix under which page navigation requires `read` on every segment.
///
/// Each path segment after the root names a subject. An explicit segment
/// map can translate route segments into catalog subjects; segments without
/// a mapping are checked under their own lower-cased name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedArea {
    root: String,
    segment_subjects: BTreeMap<String, SubjectName>,
}

impl ProtectedArea {
    /// Creates a protected area rooted at an absolute path such as `/doctor`.
    pub fn new(root: &str) -> AppResult<Self> {
        let trimmed = root.trim();
        if !trimmed.starts_with('/') {
            return Err(AppError::Validation(format!(
                "protected root '{root}' must start with '/'"
            )));
        }

        Ok(Self {
            root: trimmed.trim_end_matches('/').to_owned(),
            segment_subjects: BTreeMap::new(),
        })
    }

    /// Maps a route segment onto an explicit subject.
    pub fn with_segment_subject(mut self, segment: &str, subject: &str) -> AppResult<Self> {
        let segment_key = segment.trim().to_lowercase();
        if segment_key.is_empty() || segment_key.contains('/') {
            return Err(AppError::Validation(format!(
                "route segment '{segment}' must be a single non-empty path segment"
            )));
        }

        self.segment_subjects
            .insert(segment_key, SubjectName::new(subject)?);
        Ok(self)
    }

    /// Returns the normalized root path.
    #[must_use]
    pub fn root(&self) -> &str {
        if self.root.is_empty() { "/" } else { self.root.as_str() }
    }

    /// Ensures every mapped subject is declared by the catalog.
    pub fn validate_against(&self, catalog: &SubjectCatalog) -> AppResult<()> {
        for (segment, subject) in &self.segment_subjects {
            if !catalog.contains(subject.as_str()) {
                return Err(AppError::Validation(format!(
                    "route segment '{segment}' maps to unknown subject '{subject}'"
                )));
            }
        }

        Ok(())
    }

    /// Returns whether the path is the root or lies beneath it.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.remainder(path).is_some()
    }

    /// Derives the ordered subjects a path requires, or `None` when unprotected.
    #[must_use]
    pub fn derive_subjects(&self, path: &str) -> Option<Vec<String>> {
        let remainder = self.remainder(path)?;

        Some(
            remainder
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(|segment| {
                    let segment = segment.to_lowercase();
                    self.segment_subjects
                        .get(&segment)
                        .map(|subject| subject.as_str().to_owned())
                        .unwrap_or(segment)
                })
                .collect(),
        )
    }

    /// Decides whether the ability may navigate to the path.
    #[must_use]
    pub fn authorize(&self, ability: &Ability, path: &str) -> PathDecision {
        let Some(subjects) = self.derive_subjects(path) else {
            return PathDecision::Unprotected;
        };

        subjects
            .into_iter()
            .find(|subject| !ability.can(Action::Read, subject))
            .map_or(PathDecision::Allow, |subject| PathDecision::Deny { subject })
    }

    fn remainder<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.root.as_str())?;
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    }
}
