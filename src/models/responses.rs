use serde::Serialize;

use crate::history::HistoryRecord;

#[derive(Debug, Serialize)]
pub struct AssistResponse {
    pub status: String,
    pub action: String,
    pub original_text: String,
    pub result: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub records: Vec<HistoryRecord>,
}
