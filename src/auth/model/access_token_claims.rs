use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::shared::role::Role;
use crate::users::model::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
  pub uuid: String,
  pub role: Role,
  pub exp: usize,
  pub iat: usize,
}

impl AccessTokenClaims {
  pub fn for_user(user: &User, ttl_seconds: u64) -> Self {
    let iat = Utc::now().timestamp().max(0) as usize;
    Self {
      uuid: user.uuid.clone(),
      role: user.role,
      exp: iat + ttl_seconds as usize,
      iat,
    }
  }

  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }

  pub fn is_self(&self, user_uuid: &str) -> bool {
    self.uuid == user_uuid
  }
}
