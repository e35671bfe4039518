use std::fmt::{Display, Formatter};
use std::str::FromStr;

use sanatio_core::AppError;
use serde::{Deserialize, Serialize};

/// Operation verbs a role may be granted on a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Allows creating records of the subject.
    Create,
    /// Allows viewing records and pages of the subject.
    Read,
    /// Allows editing records of the subject.
    Update,
    /// Allows removing records of the subject.
    Delete,
}

impl Action {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Returns the full action vocabulary.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[Action::Create, Action::Read, Action::Update, Action::Delete];

        ALL
    }

    /// Parses a transport value into an action.
    ///
    /// Only the exact storage values are accepted.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl Display for Action {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!("unknown action value '{value}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::Action;

    #[test]
    fn action_roundtrip_storage_value() {
        for action in Action::all() {
            let restored = Action::from_str(action.as_str());
            assert!(matches!(restored, Ok(value) if value == *action));
        }
    }

    #[test]
    fn action_parsing_is_exact() {
        assert!(Action::from_str("READ").is_err());
        assert!(Action::from_str("Read").is_err());
        assert!(Action::from_str(" delete ").is_err());
        assert!(matches!(Action::from_str("read"), Ok(Action::Read)));
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(Action::from_str("manage").is_err());
        assert!(Action::from_str("").is_err());
    }
}
