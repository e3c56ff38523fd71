use serde::Deserialize;

/// Form posted by the writing assistant page
#[derive(Debug, Deserialize)]
pub struct AssistRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlagiarismCheckRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_mode")]
    pub mode: String,
}

fn default_mode() -> String {
    "local".to_string()
}
