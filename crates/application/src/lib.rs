//! Application services and ports.

#![forbid(unsafe_code)]

mod ability_context;
mod ability_service;
mod membership_ports;
mod membership_service;
mod role_ports;
mod role_service;
mod route_guard_service;

pub use ability_context::{AbilityContext, require_ability};
pub use ability_service::AbilityService;
pub use membership_ports::{MemberRole, MembershipRepository, OrganizationRepository};
pub use membership_service::MembershipService;
pub use role_ports::{RoleDefinition, RoleRepository, SaveRoleInput, StoredRole};
pub use role_service::RoleService;
pub use route_guard_service::{GuardOutcome, RouteGuardService};
