use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Role {
  #[serde(rename = "admin")]
  Admin,
  #[serde(rename = "manager")]
  Manager,
  #[serde(rename = "driver")]
  Driver,
  #[serde(rename = "employee")]
  Employee,
}

impl Role {
  pub const ALL: [Role; 4] =
    [Role::Admin, Role::Manager, Role::Driver, Role::Employee];

  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Admin => "admin",
      Role::Manager => "manager",
      Role::Driver => "driver",
      Role::Employee => "employee",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = String;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    Role::ALL
      .into_iter()
      .find(|role| role.as_str() == value)
      .ok_or_else(|| format!("unknown role `{value}`"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_role_text_matches_json() {
    for role in Role::ALL {
      let json = serde_json::to_string(&role).unwrap();
      assert_eq!(json, format!("\"{}\"", role.as_str()));
      assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
    }
  }

  #[test]
  fn test_unknown_role() {
    assert!("customer".parse::<Role>().is_err());
  }
}
