use serde::{Deserialize, Serialize};

/// Target languages the backend can translate into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Kannada,
    Telugu,
    Tamil,
    Hindi,
}

impl Language {
    /// Short code sent to the backend as the target language
    pub fn code(&self) -> &'static str {
        match self {
            Language::Kannada => "kn",
            Language::Telugu => "te",
            Language::Tamil => "ta",
            Language::Hindi => "hi",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Kannada => "kannada",
            Language::Telugu => "telugu",
            Language::Tamil => "tamil",
            Language::Hindi => "hindi",
        }
    }

    /// Accepts either the language name or its code.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "kannada" | "kn" => Some(Language::Kannada),
            "telugu" | "te" => Some(Language::Telugu),
            "tamil" | "ta" => Some(Language::Tamil),
            "hindi" | "hi" => Some(Language::Hindi),
            _ => None,
        }
    }

    pub fn all() -> Vec<Language> {
        vec![Language::Kannada, Language::Telugu, Language::Tamil, Language::Hindi]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Kannada => "Kannada",
            Language::Telugu => "Telugu",
            Language::Tamil => "Tamil",
            Language::Hindi => "Hindi",
        }
    }
}
