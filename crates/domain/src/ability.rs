use std::collections::BTreeSet;

use crate::{Action, PermissionSet, SubjectCatalog, SubjectName};

/// Compiled, queryable form of one permission set.
///
/// An ability is immutable once built. It answers exact-match questions
/// only: there is no wildcard subject, no action hierarchy and no subject
/// inheritance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ability {
    rules: PermissionSet,
}

impl Ability {
    /// Returns an ability that grants nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compiles a permission set; an absent set grants nothing.
    #[must_use]
    pub fn compile(permission_set: Option<&PermissionSet>) -> Self {
        Self {
            rules: permission_set.cloned().unwrap_or_default(),
        }
    }

    /// Materializes full access to every subject of the catalog.
    #[must_use]
    pub fn owner(catalog: &SubjectCatalog) -> Self {
        Self {
            rules: catalog.full_permission_set(),
        }
    }

    /// Returns whether the action is granted on the subject.
    #[must_use]
    pub fn can(&self, action: Action, subject: &str) -> bool {
        self.rules.contains(subject, action)
    }

    /// Inverse of [`Ability::can`].
    #[must_use]
    pub fn cannot(&self, action: Action, subject: &str) -> bool {
        !self.can(action, subject)
    }

    /// Iterates over the compiled rules in subject order.
    pub fn rules(&self) -> impl Iterator<Item = (&SubjectName, &BTreeSet<Action>)> {
        self.rules.iter()
    }

    /// Returns the permission set this ability was compiled from.
    #[must_use]
    pub fn permission_set(&self) -> &PermissionSet {
        &self.rules
    }
}
