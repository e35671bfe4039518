use sanatio_domain::{Ability, CatalogEntry, ControlState, GateVisibility, control, gate};
use sanatio_domain::{Action, SubjectCatalog};
use serde::Serialize;
use ts_rs::TS;

/// One compiled grant of the caller's ability.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/ability-rule-response.ts"
)]
pub struct AbilityRuleResponse {
    pub subject: String,
    pub actions: Vec<String>,
}

/// Render state of one action control.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/action-control-response.ts"
)]
pub struct ActionControlResponse {
    pub action: String,
    pub enabled: bool,
    /// Tooltip shown on disabled controls.
    pub reason: Option<String>,
}

/// Render state of every control for one catalog subject.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/subject-controls-response.ts"
)]
pub struct SubjectControlsResponse {
    pub subject: String,
    /// Whether read-gated content for the subject is shown.
    pub visible: bool,
    pub actions: Vec<ActionControlResponse>,
}

/// The caller's ability in transport form.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/abilities-response.ts"
)]
pub struct AbilitiesResponse {
    pub rules: Vec<AbilityRuleResponse>,
    pub controls: Vec<SubjectControlsResponse>,
}

impl AbilitiesResponse {
    /// Builds the response from a compiled ability and the subject catalog.
    #[must_use]
    pub fn from_ability(ability: &Ability, catalog: &SubjectCatalog) -> Self {
        let rules = ability
            .rules()
            .map(|(subject, actions)| AbilityRuleResponse {
                subject: subject.as_str().to_owned(),
                actions: actions
                    .iter()
                    .map(|action| action.as_str().to_owned())
                    .collect(),
            })
            .collect();

        let controls = catalog
            .entries()
            .iter()
            .map(|entry| subject_controls(ability, entry))
            .collect();

        Self { rules, controls }
    }
}

fn subject_controls(ability: &Ability, entry: &CatalogEntry) -> SubjectControlsResponse {
    let subject = entry.subject().as_str();

    SubjectControlsResponse {
        subject: subject.to_owned(),
        visible: gate(ability, Action::Read, subject) == GateVisibility::Visible,
        actions: entry
            .actions()
            .iter()
            .map(|action| match control(ability, *action, subject) {
                ControlState::Enabled => ActionControlResponse {
                    action: action.as_str().to_owned(),
                    enabled: true,
                    reason: None,
                },
                ControlState::Disabled { reason } => ActionControlResponse {
                    action: action.as_str().to_owned(),
                    enabled: false,
                    reason: Some(reason),
                },
            })
            .collect(),
    }
}

/// Catalog subject with the actions role editors may grant on it.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/subject-catalog-entry-response.ts"
)]
pub struct SubjectCatalogEntryResponse {
    pub subject: String,
    pub actions: Vec<String>,
}

impl From<&CatalogEntry> for SubjectCatalogEntryResponse {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            subject: entry.subject().as_str().to_owned(),
            actions: entry
                .actions()
                .iter()
                .map(|action| action.as_str().to_owned())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use sanatio_domain::{Ability, Action, PermissionSet, SubjectCatalog};

    use super::AbilitiesResponse;

    #[test]
    fn controls_cover_every_catalog_subject() {
        let catalog = SubjectCatalog::hospital_default();
        let Ok(permission_set) = PermissionSet::from_grants([("patient", vec![Action::Read])])
        else {
            panic!("grants should build");
        };
        let ability = Ability::compile(Some(&permission_set));

        let response = AbilitiesResponse::from_ability(&ability, &catalog);

        assert_eq!(response.rules.len(), 1);
        assert_eq!(response.controls.len(), catalog.entries().len());

        let Some(patient) = response
            .controls
            .iter()
            .find(|controls| controls.subject == "patient")
        else {
            panic!("patient controls should be present");
        };
        assert!(patient.visible);
        let update = patient
            .actions
            .iter()
            .find(|control| control.action == "update");
        assert!(update.is_some_and(|control| {
            !control.enabled
                && control.reason.as_deref() == Some("You do not have permission to update patient")
        }));
    }

    #[test]
    fn hidden_subjects_are_marked_invisible() {
        let catalog = SubjectCatalog::hospital_default();
        let response = AbilitiesResponse::from_ability(&Ability::empty(), &catalog);

        assert!(response.rules.is_empty());
        assert!(response.controls.iter().all(|controls| !controls.visible));
    }
}
