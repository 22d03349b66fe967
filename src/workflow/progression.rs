// src/workflow/progression.rs
//
// Stage progression rules. The backend is the arbiter of record; these checks
// guard local actions and keep bucket moves honest.
use chrono::Utc;

use crate::errors::{GatePassError, GatePassResult};
use crate::gateway::BucketKind;
use crate::models::{Outcome, Stage, StatusRecord};

/// Which bucket of a stage's desk a record belongs to. A request reaches a
/// later stage's pending bucket only once every earlier stage approved.
pub fn visible_in(record: &StatusRecord, stage: Stage, bucket: BucketKind) -> bool {
    match bucket {
        BucketKind::Pending => {
            record.outcome(stage) == Outcome::Pending
                && !record.is_rejected()
                && stage
                    .predecessors()
                    .iter()
                    .all(|s| record.outcome(*s) == Outcome::Approved)
        }
        BucketKind::Approved => record.outcome(stage) == Outcome::Approved,
        BucketKind::Rejected => record.outcome(stage) == Outcome::Rejected,
    }
}

/// Guard an approve/reject action at the given stage.
pub fn can_act(record: &StatusRecord, stage: Stage) -> GatePassResult<()> {
    if record.is_rejected() {
        return Err(GatePassError::validation(format!(
            "Request {} was already rejected; no further action is possible",
            record.reference_no
        )));
    }
    if record.outcome(stage) == Outcome::Approved {
        return Err(GatePassError::validation(format!(
            "Request {} was already approved at the {} stage",
            record.reference_no,
            stage.label()
        )));
    }
    for earlier in stage.predecessors() {
        if record.outcome(*earlier) != Outcome::Approved {
            return Err(GatePassError::validation(format!(
                "Request {} is still awaiting the {}",
                record.reference_no,
                earlier.label()
            )));
        }
    }
    Ok(())
}

pub fn apply_approval(
    record: &mut StatusRecord,
    stage: Stage,
    actor_service_no: &str,
    comment: Option<String>,
) -> GatePassResult<()> {
    can_act(record, stage)?;
    let slot = record.stage_mut(stage);
    slot.outcome = Outcome::Approved;
    slot.comment = comment;
    slot.actor_service_no = Some(actor_service_no.to_string());
    slot.acted_at = Some(Utc::now().naive_utc());
    if let Some(next) = stage.next() {
        record.current_stage = next;
    }
    Ok(())
}

pub fn apply_rejection(
    record: &mut StatusRecord,
    stage: Stage,
    actor_service_no: &str,
    comment: &str,
) -> GatePassResult<()> {
    let comment = comment.trim();
    if comment.is_empty() {
        return Err(GatePassError::validation(
            "A comment is required to reject a request",
        ));
    }
    can_act(record, stage)?;
    let slot = record.stage_mut(stage);
    slot.outcome = Outcome::Rejected;
    slot.comment = Some(comment.to_string());
    slot.actor_service_no = Some(actor_service_no.to_string());
    slot.acted_at = Some(Utc::now().naive_utc());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> StatusRecord {
        StatusRecord::new(
            "REQ-0001",
            NaiveDate::from_ymd_opt(2026, 3, 14)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        )
    }

    #[test]
    fn stages_must_act_in_sequence() {
        let mut rec = record();
        assert!(can_act(&rec, Stage::Verify).is_err());
        assert!(can_act(&rec, Stage::Dispatch).is_err());

        apply_approval(&mut rec, Stage::Executive, "10001", None).unwrap();
        assert!(can_act(&rec, Stage::Verify).is_ok());
        assert!(can_act(&rec, Stage::Dispatch).is_err());

        apply_approval(&mut rec, Stage::Verify, "10002", Some("checked".into())).unwrap();
        apply_approval(&mut rec, Stage::Dispatch, "10003", None).unwrap();
        assert!(can_act(&rec, Stage::Receive).is_ok());
        assert_eq!(rec.current_stage, Stage::Receive);
    }

    #[test]
    fn later_stage_approval_implies_all_earlier_approved() {
        let mut rec = record();
        apply_approval(&mut rec, Stage::Executive, "10001", None).unwrap();
        apply_approval(&mut rec, Stage::Verify, "10002", None).unwrap();
        apply_approval(&mut rec, Stage::Dispatch, "10003", None).unwrap();

        for earlier in Stage::Dispatch.predecessors() {
            assert_eq!(rec.outcome(*earlier), Outcome::Approved);
        }
    }

    #[test]
    fn rejection_is_terminal_for_every_later_stage() {
        let mut rec = record();
        apply_approval(&mut rec, Stage::Executive, "10001", None).unwrap();
        apply_rejection(&mut rec, Stage::Verify, "10002", "items do not match the list").unwrap();

        assert!(rec.is_rejected());
        assert!(can_act(&rec, Stage::Dispatch).is_err());
        assert!(can_act(&rec, Stage::Receive).is_err());
        assert!(!visible_in(&rec, Stage::Dispatch, BucketKind::Pending));
        assert!(visible_in(&rec, Stage::Verify, BucketKind::Rejected));
    }

    #[test]
    fn rejection_requires_a_non_blank_comment() {
        let mut rec = record();
        let err = apply_rejection(&mut rec, Stage::Executive, "10001", "   ").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(rec.outcome(Stage::Executive), Outcome::Pending);
    }

    #[test]
    fn double_approval_is_refused() {
        let mut rec = record();
        apply_approval(&mut rec, Stage::Executive, "10001", None).unwrap();
        assert!(apply_approval(&mut rec, Stage::Executive, "10001", None).is_err());
    }

    #[test]
    fn pending_visibility_requires_every_predecessor() {
        let mut rec = record();
        assert!(visible_in(&rec, Stage::Executive, BucketKind::Pending));
        assert!(!visible_in(&rec, Stage::Verify, BucketKind::Pending));

        apply_approval(&mut rec, Stage::Executive, "10001", None).unwrap();
        assert!(visible_in(&rec, Stage::Verify, BucketKind::Pending));
        assert!(visible_in(&rec, Stage::Executive, BucketKind::Approved));
        assert!(!visible_in(&rec, Stage::Dispatch, BucketKind::Pending));
    }
}
