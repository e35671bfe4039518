//! Permission model for hospital staff: subjects, actions, permission sets
//! and the abilities compiled from them.

#![forbid(unsafe_code)]

mod ability;
mod action;
mod capability_gate;
mod permission_set;
mod protected_area;
mod subject;

pub use ability::Ability;
pub use action::Action;
pub use capability_gate::{ControlState, GateVisibility, control, gate};
pub use permission_set::{ParsedPermissionDocument, PermissionSet};
pub use protected_area::{PathDecision, ProtectedArea};
pub use subject::{CatalogEntry, SubjectCatalog, SubjectName};
