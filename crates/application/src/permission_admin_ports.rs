mod groups;
mod grants;
mod repository;

pub use grants::{DirectGrantAudit, GrantPermissionsInput, GroupMembership, UserAccessSummary};
pub use groups::{CreateGroupInput, GroupDefinition, NewGroup};
pub use repository::PermissionAdminRepository;
