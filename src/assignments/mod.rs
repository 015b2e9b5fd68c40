pub mod model;
pub mod repository;
pub mod rto;
pub mod tracker;

use actix_web::HttpResponse;
use model::{AssignmentKind, AssignmentRecord};
use repository::assignment_repository::AssignmentHistoryRepository;
use rto::assignment_rto::{AssignmentHistoryRto, AssignmentRto};

use crate::shared::responses::{ok, repository_error};

/// Which side of the link a history endpoint is looking from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySide {
  Subject,
  Assignee,
}

pub async fn history_response<HR: AssignmentHistoryRepository>(
  history_repository: &HR,
  kind: AssignmentKind,
  side: HistorySide,
  uuid: &str,
) -> HttpResponse {
  let records = match side {
    HistorySide::Subject => history_repository.find_by_subject(kind, uuid).await,
    HistorySide::Assignee => {
      history_repository.find_by_assignee(kind, uuid).await
    }
  };
  records
    .map(|records| {
      ok(AssignmentHistoryRto {
        items: records.into_iter().map(AssignmentRto::from).collect(),
      })
    })
    .unwrap_or_else(repository_error)
}

impl From<AssignmentRecord> for AssignmentRto {
  fn from(record: AssignmentRecord) -> Self {
    Self {
      uuid: record.uuid,
      kind: record.kind,
      subject_uuid: record.subject_uuid,
      assignee_uuid: record.assignee_uuid,
      assigned_at: record.assigned_at,
      released_at: record.released_at,
      is_current: record.is_current,
    }
  }
}
