use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenRto {
  pub access_token: String,
  pub token_type: String,
  pub expires_in: u64,
}
