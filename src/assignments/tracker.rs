use chrono::Utc;

use crate::assignments::model::{AssignmentChange, AssignmentKind};
use crate::assignments::repository::assignment_repository::AssignmentTransition;
use crate::custom_nanoid;

/// The history writes that bring `subject_uuid` in line with an entity
/// update moving its assignee from `previous` to `next`.
///
/// Empty when the assignee did not change. Otherwise one transition that
/// closes the current record and, unless the assignee was cleared, opens a
/// new current record. The repository performing the entity write applies
/// it in the same transaction.
pub fn track(
  kind: AssignmentKind,
  subject_uuid: &str,
  previous: Option<&str>,
  next: Option<&str>,
) -> Vec<AssignmentTransition> {
  let change = AssignmentChange::between(previous, next);
  if change.is_unchanged() {
    return Vec::new();
  }
  log::debug!("{kind} {subject_uuid}: {change:?}");
  vec![AssignmentTransition {
    uuid: custom_nanoid(),
    kind,
    subject_uuid: subject_uuid.to_string(),
    assignee_uuid: change.next_assignee().map(String::from),
    at: Utc::now(),
  }]
}

/// Logs transitions once the write carrying them has committed.
pub fn recorded(transitions: &[AssignmentTransition]) {
  for transition in transitions {
    match &transition.assignee_uuid {
      Some(assignee_uuid) => log::info!(
        "{} {} assigned to {assignee_uuid}",
        transition.kind,
        transition.subject_uuid
      ),
      None => {
        log::info!("{} {} released", transition.kind, transition.subject_uuid)
      }
    }
  }
}
