use serde::{Deserialize, Serialize};

/// Body of every `201 Created` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedRto {
  pub uuid: String,
}

impl From<&str> for CreatedRto {
  fn from(uuid: &str) -> Self {
    Self {
      uuid: String::from(uuid),
    }
  }
}

impl From<String> for CreatedRto {
  fn from(uuid: String) -> Self {
    Self { uuid }
  }
}
