use chrono::{DateTime, Utc};

use crate::shared::role::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
  pub uuid: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub user_name: String,
  pub email: String,
  pub full_name: String,
  pub role: Role,
  pub department_uuid: Option<String>,
  pub password_hash: String,
  pub is_active: bool,
}

impl User {
  /// Only active drivers can be put behind a wheel.
  pub fn can_drive(&self) -> bool {
    self.is_active && self.role == Role::Driver
  }
}

#[cfg(test)]
pub mod tests {
  use chrono::Utc;
  use fake::faker::internet::en::{SafeEmail, Username};
  use fake::faker::name::en::Name;
  use fake::Fake;

  use super::User;
  use crate::custom_nanoid;
  use crate::shared::role::Role;

  pub fn fake_user(role: Role) -> User {
    let user_name: String = Username().fake();
    User {
      uuid: custom_nanoid(),
      created_at: Utc::now(),
      updated_at: Utc::now(),
      user_name: format!("{user_name}_{}", &custom_nanoid()[..6]),
      email: SafeEmail().fake(),
      full_name: Name().fake(),
      role,
      department_uuid: None,
      password_hash: String::from("not-a-real-hash"),
      is_active: true,
    }
  }

  #[test]
  fn test_can_drive() {
    assert!(fake_user(Role::Driver).can_drive());
    assert!(!fake_user(Role::Manager).can_drive());

    let inactive = User {
      is_active: false,
      ..fake_user(Role::Driver)
    };
    assert!(!inactive.can_drive());
  }
}
