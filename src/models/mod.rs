pub mod requests;
pub mod responses;

pub use requests::{AssistRequest, PlagiarismCheckRequest};
pub use responses::{AssistResponse, HealthResponse, HistoryResponse};
