use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{Assignment, RoomId, RoomLabels, Submission, PARTICIPANT_COUNT, ROOM_COUNT},
    error::ApiError,
};

pub const SUBMISSIONS_ROUTE: &str = "/api/submissions";
pub const SUBMIT_ROUTE: &str = "/api/submit";
pub const CALCULATE_ROUTE: &str = "/api/calculate";
pub const RESET_ROUTE: &str = "/api/reset";

/// Body of `POST /api/submit`. Values are positional, one per room; a value the
/// form could not parse is sent as `null` and left to the server to reject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub name: String,
    pub values: [Option<f64>; ROOM_COUNT],
}

/// Reply to `POST /api/submit` and `POST /api/reset`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Acknowledgement {
    pub fn ok() -> Self {
        Self {
            success: Some(true),
            ..Self::default()
        }
    }

    /// `{ "success": true }`, or a bare `{ "message": ... }` without any error.
    pub fn is_success(&self) -> bool {
        match self.success {
            Some(flag) => flag,
            None => self.error.is_none() && self.message.is_some(),
        }
    }

    pub fn into_error(self) -> ApiError {
        ApiError {
            success: self.success,
            error: self.error,
            message: self.message,
        }
    }
}

/// Reply to `GET /api/submissions`; both the wrapped and the bare list are in use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmissionsResponse {
    Wrapped { submissions: Vec<Submission> },
    Bare(Vec<Submission>),
}

impl SubmissionsResponse {
    pub fn into_submissions(self) -> Vec<Submission> {
        match self {
            Self::Wrapped { submissions } | Self::Bare(submissions) => submissions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateResponse {
    pub success: bool,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Index-based result shape: `assignments[person]` is a room index, `prices`
/// are per room and `valuations[person][room]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyCalculateResponse {
    pub method: String,
    pub assignments: Vec<usize>,
    pub prices: Vec<f64>,
    pub names: Vec<String>,
    pub valuations: Vec<Vec<f64>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LegacyShapeError {
    #[error("expected 3 {field}, got {actual}")]
    WrongLength { field: &'static str, actual: usize },
    #[error("room index {0} is out of range")]
    RoomOutOfRange(usize),
}

impl LegacyCalculateResponse {
    pub fn to_assignments(
        &self,
        labels: &RoomLabels,
    ) -> Result<Vec<Assignment>, LegacyShapeError> {
        check_len("assignments", self.assignments.len())?;
        check_len("prices", self.prices.len())?;
        check_len("names", self.names.len())?;
        check_len("valuations", self.valuations.len())?;

        self.names
            .iter()
            .zip(&self.assignments)
            .zip(&self.valuations)
            .map(|((person, &room_index), person_valuations)| {
                let room = RoomId::from_index(room_index)
                    .ok_or(LegacyShapeError::RoomOutOfRange(room_index))?;
                check_len("valuations per person", person_valuations.len())?;
                Ok(Assignment {
                    person: person.clone(),
                    room: labels.label(room).to_string(),
                    valuation: person_valuations[room.index()],
                    rent: self.prices[room.index()],
                })
            })
            .collect()
    }
}

fn check_len(field: &'static str, actual: usize) -> Result<(), LegacyShapeError> {
    if actual == PARTICIPANT_COUNT {
        Ok(())
    } else {
        Err(LegacyShapeError::WrongLength { field, actual })
    }
}

/// Every body `GET /api/calculate` is known to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalculateBody {
    Detailed(CalculateResponse),
    Legacy(LegacyCalculateResponse),
    Failure(ApiError),
}
