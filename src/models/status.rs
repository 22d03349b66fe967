// src/models/status.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::request::MovementRequest;

/// ✅ **Approval stage in the sequential chain**
///
/// Later-stage approval implies all earlier stages recorded `Approved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Executive,
    Verify,
    Dispatch,
    Receive,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Executive, Stage::Verify, Stage::Dispatch, Stage::Receive];

    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Executive => Some(Stage::Verify),
            Stage::Verify => Some(Stage::Dispatch),
            Stage::Dispatch => Some(Stage::Receive),
            Stage::Receive => None,
        }
    }

    /// Stages that must already be approved before this one may act.
    pub fn predecessors(self) -> &'static [Stage] {
        match self {
            Stage::Executive => &[],
            Stage::Verify => &[Stage::Executive],
            Stage::Dispatch => &[Stage::Executive, Stage::Verify],
            Stage::Receive => &[Stage::Executive, Stage::Verify, Stage::Dispatch],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Executive => "executive",
            Stage::Verify => "verify",
            Stage::Dispatch => "dispatch",
            Stage::Receive => "receive",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Executive => "Executive Officer",
            Stage::Verify => "Verify Officer",
            Stage::Dispatch => "Petrol Leader",
            Stage::Receive => "Receiver",
        }
    }
}

/// ✅ **Per-stage outcome**
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// One stage's slice of the approval record: outcome, free-text comment and
/// the acting officer's service number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub outcome: Outcome,
    pub comment: Option<String>,
    pub actor_service_no: Option<String>,
    pub acted_at: Option<NaiveDateTime>,
}

/// Loading details optionally attached when the Verify stage approves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingDetails {
    pub vehicle_no: String,
    pub driver_name: String,
    pub remarks: Option<String>,
}

/// ✅ **Approval record accumulated by one request**
///
/// The reference number is unique and never reassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub reference_no: String,
    pub current_stage: Stage,
    pub executive: StageRecord,
    pub verify: StageRecord,
    pub dispatch: StageRecord,
    pub receive: StageRecord,
    pub loading_details: Option<LoadingDetails>,
    pub created_at: NaiveDateTime,
}

impl StatusRecord {
    pub fn new(reference_no: impl Into<String>, created_at: NaiveDateTime) -> Self {
        Self {
            reference_no: reference_no.into(),
            current_stage: Stage::Executive,
            executive: StageRecord::default(),
            verify: StageRecord::default(),
            dispatch: StageRecord::default(),
            receive: StageRecord::default(),
            loading_details: None,
            created_at,
        }
    }

    pub fn stage(&self, stage: Stage) -> &StageRecord {
        match stage {
            Stage::Executive => &self.executive,
            Stage::Verify => &self.verify,
            Stage::Dispatch => &self.dispatch,
            Stage::Receive => &self.receive,
        }
    }

    pub fn stage_mut(&mut self, stage: Stage) -> &mut StageRecord {
        match stage {
            Stage::Executive => &mut self.executive,
            Stage::Verify => &mut self.verify,
            Stage::Dispatch => &mut self.dispatch,
            Stage::Receive => &mut self.receive,
        }
    }

    pub fn outcome(&self, stage: Stage) -> Outcome {
        self.stage(stage).outcome
    }

    /// A rejection at any stage is terminal for the whole request.
    pub fn is_rejected(&self) -> bool {
        Stage::ALL
            .iter()
            .any(|s| self.stage(*s).outcome == Outcome::Rejected)
    }

    pub fn is_completed(&self) -> bool {
        self.receive.outcome == Outcome::Approved
    }
}

/// Raw record returned by the status listing endpoints: the approval record
/// together with the movement request it tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusListing {
    pub status: StatusRecord,
    pub request: MovementRequest,
}
