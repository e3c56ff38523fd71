use serde::Serialize;

use crate::config::constants::DEFAULT_TONE;

/// Instruction shared by every action
const BASE_INSTRUCTION: &str = "You are an expert AI writing assistant. \
Return ONLY the processed output. No conversational filler. \
Use Markdown formatting.";

/// Writing transformation requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Proofread,
    Rewrite,
    Seo,
    /// Anything unrecognised: the text is passed through with the base instruction
    Generic,
}

impl Action {
    /// Parse a form value; unknown or missing actions become `Generic`
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("proofread") => Action::Proofread,
            Some("rewrite") => Action::Rewrite,
            Some("seo") => Action::Seo,
            _ => Action::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Proofread => "proofread",
            Action::Rewrite => "rewrite",
            Action::Seo => "seo",
            Action::Generic => "generic",
        }
    }
}

/// Resolve the tone hint, falling back to the default when absent or blank
pub fn resolve_tone(tone: Option<&str>) -> &str {
    match tone.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => DEFAULT_TONE,
    }
}

/// Build the instruction string sent to the language model
///
/// The raw text always comes last. The tone is only used by the proofread and
/// rewrite templates.
pub fn build_prompt(action: Action, text: &str, tone: &str) -> String {
    let instruction = match action {
        Action::Proofread => format!(
            "Correct grammar, spelling, and punctuation. Tone: {}.\n\n",
            tone
        ),
        Action::Rewrite => format!("Rewrite this text to be {}. Improve clarity.\n\n", tone),
        Action::Seo => "Generate SEO titles, keywords, and meta description.\n\n".to_string(),
        Action::Generic => String::new(),
    };

    format!("{}\n\n{}{}", BASE_INSTRUCTION, instruction, text)
}
