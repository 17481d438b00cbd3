//! Language tag shared by email templates, the chat persona and
//! user-facing API messages.

use serde::{Deserialize, Serialize};

/// UI language. The site defaults to Traditional Chinese.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "zh", alias = "zh-HK", alias = "zh-TW")]
    Zh,
    #[serde(rename = "en")]
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }

    /// Shown when a registration's email is already on file.
    pub fn duplicate_registration(&self) -> &'static str {
        match self {
            Language::Zh => "此電郵地址已經登記。",
            Language::En => "This email address has already been registered.",
        }
    }

    /// Shown when the registration could not be stored.
    pub fn registration_unavailable(&self) -> &'static str {
        match self {
            Language::Zh => "暫時未能儲存您的登記，請稍後再試。",
            Language::En => "We could not save your registration right now. Please try again later.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_regional_aliases() {
        let lang: Language = serde_json::from_str("\"zh-HK\"").unwrap();
        assert_eq!(lang, Language::Zh);
        let lang: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(lang, Language::En);
        assert_eq!(Language::default(), Language::Zh);
    }
}
