use salesdesk_core::{AppResult, GroupId, UserId};
use salesdesk_domain::PermissionCode;

pub mod access;
pub mod groups;
pub mod health;
pub mod users;

fn permission_codes(values: &[String]) -> AppResult<Vec<PermissionCode>> {
    values
        .iter()
        .map(|value| PermissionCode::from_transport(value.as_str()))
        .collect()
}

fn group_id(value: i64) -> AppResult<GroupId> {
    GroupId::new(value)
}

fn user_id(value: i64) -> AppResult<UserId> {
    UserId::new(value)
}
