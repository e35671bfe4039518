use std::sync::{Arc, OnceLock};

use sanatio_core::{AppError, AppResult};
use sanatio_domain::{Ability, Action};
use tracing::error;

/// Request-scoped holder of the caller's compiled ability.
///
/// The context is created empty, initialized exactly once per request and
/// read-only afterwards. Reading an empty context is a programming error and
/// is reported as [`AppError::ContextNotInitialized`], never as a default
/// allow or deny.
#[derive(Debug, Clone, Default)]
pub struct AbilityContext {
    ability: Arc<OnceLock<Ability>>,
}

impl AbilityContext {
    /// Creates a context that has not been initialized yet.
    #[must_use]
    pub fn uninitialized() -> Self {
        Self::default()
    }

    /// Creates a context already holding the ability.
    #[must_use]
    pub fn initialized(ability: Ability) -> Self {
        Self {
            ability: Arc::new(OnceLock::from(ability)),
        }
    }

    /// Stores the ability; fails when the context was already initialized.
    pub fn initialize(&self, ability: Ability) -> AppResult<()> {
        self.ability.set(ability).map_err(|_| {
            AppError::Internal("ability context was initialized twice".to_owned())
        })
    }

    /// Returns the compiled ability.
    pub fn ability(&self) -> AppResult<&Ability> {
        self.ability.get().ok_or_else(|| {
            error!("ability context read before initialization");
            AppError::ContextNotInitialized(
                "the request ability was read before it was built".to_owned(),
            )
        })
    }

    /// Returns whether the ability grants the action on the subject.
    pub fn can(&self, action: Action, subject: &str) -> AppResult<bool> {
        Ok(self.ability()?.can(action, subject))
    }

    /// Ensures the ability grants the action on the subject.
    pub fn require(&self, action: Action, subject: &str) -> AppResult<()> {
        require_ability(self.ability()?, action, subject)
    }
}

/// Ensures an ability grants the action on the subject.
pub fn require_ability(ability: &Ability, action: Action, subject: &str) -> AppResult<()> {
    if ability.can(action, subject) {
        return Ok(());
    }

    Err(AppError::Forbidden(format!(
        "missing permission '{action}' on subject '{subject}'"
    )))
}
