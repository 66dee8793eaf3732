//! Language selection for speech synthesis.
//!
//! The synthesis provider accepts a small fixed set of language codes.
//! Regional variants (`en-uk`, `en-us`) exist only for the UI dropdown —
//! before any provider call the selection is normalized to its base code
//! ([`Language::base_code`]), i.e. the segment before the first hyphen.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Closed set of selectable synthesis languages.
///
/// ```
/// use speakback::lang::Language;
///
/// assert_eq!(Language::EnUk.code(), "en-uk");
/// assert_eq!(Language::EnUk.base_code(), "en");
/// assert_eq!(Language::default(), Language::En);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    /// English (provider default accent).
    #[serde(rename = "en")]
    En,
    /// English, British accent.
    #[serde(rename = "en-uk")]
    EnUk,
    /// English, American accent.
    #[serde(rename = "en-us")]
    EnUs,
    /// German.
    #[serde(rename = "de")]
    De,
    /// French.
    #[serde(rename = "fr")]
    Fr,
}

impl Language {
    /// Every selectable language, in UI display order.
    pub const ALL: [Language; 5] = [
        Language::En,
        Language::EnUk,
        Language::EnUs,
        Language::De,
        Language::Fr,
    ];

    /// The full selection code as shown in the UI (e.g. `"en-uk"`).
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::EnUk => "en-uk",
            Language::EnUs => "en-us",
            Language::De => "de",
            Language::Fr => "fr",
        }
    }

    /// The code actually sent to the synthesis provider: the segment of
    /// [`code`](Self::code) before the first hyphen.
    pub fn base_code(self) -> &'static str {
        match self {
            Language::En | Language::EnUk | Language::EnUs => "en",
            Language::De => "de",
            Language::Fr => "fr",
        }
    }

    /// Parse a selection code (`"en-uk"` etc.).  Returns `None` for codes
    /// outside the closed set.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|l| l.code() == code)
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_first_entry_of_allow_list() {
        assert_eq!(Language::default(), Language::ALL[0]);
    }

    #[test]
    fn base_code_strips_regional_variant() {
        assert_eq!(Language::EnUk.base_code(), "en");
        assert_eq!(Language::EnUs.base_code(), "en");
    }

    #[test]
    fn base_code_is_identity_for_plain_codes() {
        assert_eq!(Language::En.base_code(), "en");
        assert_eq!(Language::De.base_code(), "de");
        assert_eq!(Language::Fr.base_code(), "fr");
    }

    #[test]
    fn base_code_never_contains_hyphen() {
        for lang in Language::ALL {
            assert!(
                !lang.base_code().contains('-'),
                "{lang} has hyphenated base code"
            );
        }
    }

    #[test]
    fn from_code_round_trips_all_variants() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
    }

    #[test]
    fn from_code_rejects_unknown() {
        assert_eq!(Language::from_code("es"), None);
        assert_eq!(Language::from_code(""), None);
    }

    #[test]
    fn serde_uses_selection_codes() {
        let json = serde_json::to_string(&Language::EnUk).unwrap();
        assert_eq!(json, "\"en-uk\"");
        let back: Language = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Language::EnUk);
    }
}
