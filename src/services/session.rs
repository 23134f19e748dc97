use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::EvaluationRecord;

/// Error types for session state transitions
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SessionError {
    #[error("session is not awaiting a menu selection")]
    NotAwaitingSelection,
    #[error("session is not awaiting ratings")]
    NotAwaitingRatings,
    #[error("expected {expected} ratings, got {got}")]
    RatingCountMismatch { expected: usize, got: usize },
    #[error("ratings must be 0 or 1")]
    InvalidRating,
    #[error("session is not ready to submit")]
    NotReadyToSubmit,
}

/// Where a session is in the evaluation wizard.
///
/// The flow is select menu -> rate recommendations, repeated for the agreed
/// number of iterations, then a single upload of everything collected.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Waiting for the participant to pick a menu item (1-based iteration)
    AwaitingRecommendation { iteration: u32 },
    /// Recommendations shown, waiting for relevance judgements
    AwaitingRating {
        iteration: u32,
        menu: String,
        recommendations: Vec<String>,
    },
    /// All iterations rated, records not yet uploaded
    ReadyToSubmit,
    /// Upload in progress
    Submitting,
    /// Records handed to the submission client, session finished
    Done,
}

impl SessionState {
    /// Wire name of the state, used in API snapshots.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::AwaitingRecommendation { .. } => "awaiting_recommendation",
            SessionState::AwaitingRating { .. } => "awaiting_rating",
            SessionState::ReadyToSubmit => "ready_to_submit",
            SessionState::Submitting => "submitting",
            SessionState::Done => "done",
        }
    }
}

impl Serialize for SessionState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// One participant's evaluation run, driven through its states by the API
/// handlers. All mutation happens through the transition methods below.
pub struct Session {
    pub id: Uuid,
    pub participant: String,
    pub total_iterations: u32,
    pub started_at: DateTime<Utc>,
    pub state: SessionState,
    pub records: Vec<EvaluationRecord>,
}

impl Session {
    pub fn new(participant: String, total_iterations: u32) -> Self {
        let state = if total_iterations == 0 {
            SessionState::ReadyToSubmit
        } else {
            SessionState::AwaitingRecommendation { iteration: 1 }
        };

        Self {
            id: Uuid::new_v4(),
            participant,
            total_iterations,
            started_at: Utc::now(),
            state,
            records: Vec::new(),
        }
    }

    /// Current 1-based iteration, when the session is inside the loop.
    pub fn iteration(&self) -> Option<u32> {
        match &self.state {
            SessionState::AwaitingRecommendation { iteration } => Some(*iteration),
            SessionState::AwaitingRating { iteration, .. } => Some(*iteration),
            _ => None,
        }
    }

    /// Records the menu picked this iteration together with the ranked
    /// recommendations shown for it. Returns the iteration they belong to.
    pub fn accept_recommendations(
        &mut self,
        menu: String,
        recommendations: Vec<String>,
    ) -> Result<u32, SessionError> {
        let iteration = match &self.state {
            SessionState::AwaitingRecommendation { iteration } => *iteration,
            _ => return Err(SessionError::NotAwaitingSelection),
        };

        self.state = SessionState::AwaitingRating {
            iteration,
            menu,
            recommendations,
        };
        Ok(iteration)
    }

    /// Stores the relevance judgements for the pending recommendations and
    /// advances to the next iteration, or to ReadyToSubmit after the last one.
    pub fn accept_ratings(&mut self, ratings: Vec<u8>) -> Result<(), SessionError> {
        let (iteration, menu, recommendations) = match &self.state {
            SessionState::AwaitingRating {
                iteration,
                menu,
                recommendations,
            } => (*iteration, menu.clone(), recommendations.clone()),
            _ => return Err(SessionError::NotAwaitingRatings),
        };

        if ratings.len() != recommendations.len() {
            return Err(SessionError::RatingCountMismatch {
                expected: recommendations.len(),
                got: ratings.len(),
            });
        }
        if ratings.iter().any(|r| *r > 1) {
            return Err(SessionError::InvalidRating);
        }

        self.records.push(EvaluationRecord {
            participant: self.participant.clone(),
            iteration,
            input_menu: menu,
            recommendations,
            ratings,
        });

        self.state = if iteration >= self.total_iterations {
            SessionState::ReadyToSubmit
        } else {
            SessionState::AwaitingRecommendation {
                iteration: iteration + 1,
            }
        };
        Ok(())
    }

    /// Hands out a copy of the collected records for upload and marks the
    /// session as submitting. A second call while the upload runs is rejected.
    pub fn begin_submission(&mut self) -> Result<Vec<EvaluationRecord>, SessionError> {
        match self.state {
            SessionState::ReadyToSubmit => {
                self.state = SessionState::Submitting;
                Ok(self.records.clone())
            }
            _ => Err(SessionError::NotReadyToSubmit),
        }
    }

    /// Marks the upload finished. Failed records are not kept for retry.
    pub fn finish_submission(&mut self) {
        self.state = SessionState::Done;
    }
}
