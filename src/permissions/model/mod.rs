use std::fmt;

use chrono::{DateTime, Utc};

use crate::shared::role::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
  pub uuid: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub name: String,
  pub description: Option<String>,
}

pub const RESOURCES: [&str; 7] = [
  "departments",
  "users",
  "vendors",
  "vehicles",
  "routes",
  "trips",
  "permissions",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  View,
  Create,
  Update,
  Delete,
}

impl Action {
  pub const ALL: [Action; 4] =
    [Action::View, Action::Create, Action::Update, Action::Delete];

  pub fn as_str(&self) -> &'static str {
    match self {
      Action::View => "view",
      Action::Create => "create",
      Action::Update => "update",
      Action::Delete => "delete",
    }
  }

  /// Permission name guarding this action on `resource`.
  pub fn on(self, resource: &str) -> String {
    format!("{resource}.{self}")
  }
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Every `<resource>.<action>` pair.
pub fn catalogue() -> Vec<String> {
  RESOURCES
    .iter()
    .flat_map(|resource| Action::ALL.map(|action| action.on(resource)))
    .collect()
}

/// Grants seeded at boot. Admins are not listed: they hold everything.
pub fn default_grants(role: Role) -> Vec<String> {
  match role {
    Role::Admin => Vec::new(),
    Role::Manager => catalogue()
      .into_iter()
      .filter(|name| !name.starts_with("permissions."))
      .collect(),
    Role::Driver => vec![
      Action::View.on("vehicles"),
      Action::View.on("routes"),
      Action::View.on("trips"),
    ],
    Role::Employee => vec![
      Action::View.on("routes"),
      Action::View.on("vehicles"),
      Action::Create.on("trips"),
    ],
  }
}

/// `resource.action`, lowercase letters and underscores on both sides.
pub fn is_valid_permission_name(name: &str) -> bool {
  let valid_part =
    |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c == '_');
  match name.split_once('.') {
    Some((resource, action)) => valid_part(resource) && valid_part(action),
    None => false,
  }
}
