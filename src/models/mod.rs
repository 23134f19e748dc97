use serde::{Deserialize, Serialize};

/// One completed evaluation iteration, ready for upload.
///
/// Serializes to the wire field names expected by the spreadsheet web app:
/// `partisipan`, `iterasi`, `input_menu`, `rekomendasi`, `penilaian`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationRecord {
    #[serde(rename = "partisipan")]
    pub participant: String,
    #[serde(rename = "iterasi")]
    pub iteration: u32,
    pub input_menu: String,
    #[serde(rename = "rekomendasi")]
    pub recommendations: Vec<String>,
    /// 0/1 relevance judgements aligned with `recommendations`
    #[serde(rename = "penilaian")]
    pub ratings: Vec<u8>,
}
