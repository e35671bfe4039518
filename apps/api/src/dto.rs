mod access;
mod auth;
mod common;
mod roles;

pub use access::{
    AbilitiesResponse, AbilityRuleResponse, ActionControlResponse, SubjectCatalogEntryResponse,
    SubjectControlsResponse,
};
pub use auth::{BootstrapRequest, SwitchOrganizationRequest};
pub use common::{HealthResponse, UserIdentityResponse};
pub use roles::{AssignRoleRequest, RoleResponse, SaveRoleRequest};
