use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assignments::model::AssignmentKind;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRto {
  pub uuid: String,
  pub kind: AssignmentKind,
  pub subject_uuid: String,
  pub assignee_uuid: String,
  pub assigned_at: DateTime<Utc>,
  pub released_at: Option<DateTime<Utc>>,
  pub is_current: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignmentHistoryRto {
  pub items: Vec<AssignmentRto>,
}
