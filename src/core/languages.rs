//! Static table of languages DeepL can translate from

use serde::{Deserialize, Serialize};

/// A language known to the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Upper-case DeepL code, e.g. `EN`
    pub code: String,
    /// English name
    pub name: String,
}

impl Language {
    /// Create a language entry
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Source languages, ordered by code
const SOURCE_LANGUAGES: &[(&str, &str)] = &[
    ("BG", "Bulgarian"),
    ("CS", "Czech"),
    ("DA", "Danish"),
    ("DE", "German"),
    ("EL", "Greek"),
    ("EN", "English"),
    ("ES", "Spanish"),
    ("ET", "Estonian"),
    ("FI", "Finnish"),
    ("FR", "French"),
    ("HU", "Hungarian"),
    ("ID", "Indonesian"),
    ("IT", "Italian"),
    ("JA", "Japanese"),
    ("LT", "Lithuanian"),
    ("LV", "Latvian"),
    ("NL", "Dutch"),
    ("PL", "Polish"),
    ("PT", "Portuguese"),
    ("RO", "Romanian"),
    ("RU", "Russian"),
    ("SK", "Slovak"),
    ("SL", "Slovenian"),
    ("SV", "Swedish"),
    ("TR", "Turkish"),
    ("ZH", "Chinese (simplified)"),
];

/// All source languages
pub fn source_languages() -> Vec<Language> {
    SOURCE_LANGUAGES
        .iter()
        .map(|(code, name)| Language::new(*code, *name))
        .collect()
}

/// Find a language by code, ignoring case and regional suffixes like `EN-US`
pub fn find_language(code: &str) -> Option<Language> {
    let base = code.split('-').next().unwrap_or(code).trim();
    SOURCE_LANGUAGES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(base))
        .map(|(c, name)| Language::new(*c, *name))
}
