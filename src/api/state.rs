use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::data::Dataset;
use crate::services::session::Session;
use crate::services::submission::RecordSink;

/// Blend weight and result count used for every query
#[derive(Debug, Clone, Copy)]
pub struct ScoringParams {
    pub alpha: f64,
    pub top_k: usize,
}

/// Shared application state
///
/// The dataset is immutable after startup and shared without locking; only
/// the session map is behind a lock.
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub scoring: ScoringParams,
    pub sink: Arc<dyn RecordSink>,
    pub sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, scoring: ScoringParams, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            dataset,
            scoring,
            sink,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
