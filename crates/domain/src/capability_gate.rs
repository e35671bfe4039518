use serde::Serialize;

use crate::{Ability, Action};

/// Whether gated content is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateVisibility {
    /// The ability grants the action.
    Visible,
    /// The ability does not grant the action.
    Hidden,
}

/// How an interactive control is rendered.
///
/// Controls are rendered disabled rather than hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ControlState {
    /// The control may be used.
    Enabled,
    /// The control is rendered disabled with an explanatory tooltip.
    Disabled {
        /// Tooltip text.
        reason: String,
    },
}

impl ControlState {
    /// Returns whether the control may be used.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// Decides whether content guarded by `(action, subject)` is shown.
///
/// Presentation only: handlers must still check the ability themselves.
#[must_use]
pub fn gate(ability: &Ability, action: Action, subject: &str) -> GateVisibility {
    if ability.can(action, subject) {
        GateVisibility::Visible
    } else {
        GateVisibility::Hidden
    }
}

/// Decides how a control guarded by `(action, subject)` is rendered.
#[must_use]
pub fn control(ability: &Ability, action: Action, subject: &str) -> ControlState {
    if ability.can(action, subject) {
        ControlState::Enabled
    } else {
        ControlState::Disabled {
            reason: format!(
                "You do not have permission to {action} {}",
                subject.trim().to_lowercase()
            ),
        }
    }
}
