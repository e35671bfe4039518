use serde::Deserialize;
use ts_rs::TS;

/// Incoming payload for bootstrap sign-in.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bootstrap-request.ts"
)]
pub struct BootstrapRequest {
    pub subject: String,
    pub token: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Organization to sign into; defaults to the subject's first membership.
    #[serde(default)]
    pub organization_id: Option<String>,
}

/// Incoming payload for switching the active organization.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/switch-organization-request.ts"
)]
pub struct SwitchOrganizationRequest {
    pub organization_id: String,
}
