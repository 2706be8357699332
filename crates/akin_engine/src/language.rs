//! Languages served by the remote service.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};

/// A supported game language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    English,
    /// Arabic.
    Arabic,
    /// Chinese.
    Chinese,
    /// German.
    German,
    /// Spanish.
    Spanish,
    /// French.
    French,
    /// Hebrew.
    Hebrew,
    /// Italian.
    Italian,
    /// Japanese.
    Japanese,
    /// Korean.
    Korean,
    /// Dutch.
    Dutch,
    /// Polish.
    Polish,
    /// Portuguese.
    Portuguese,
    /// Russian.
    Russian,
    /// Turkish.
    Turkish,
    /// Indonesian.
    Indonesian,
}

impl Language {
    /// Two-letter code, also the remote host prefix.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Arabic => "ar",
            Language::Chinese => "zh",
            Language::German => "de",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::Hebrew => "he",
            Language::Italian => "it",
            Language::Japanese => "ja",
            Language::Korean => "ko",
            Language::Dutch => "nl",
            Language::Polish => "pl",
            Language::Portuguese => "pt",
            Language::Russian => "ru",
            Language::Turkish => "tr",
            Language::Indonesian => "id",
        }
    }

    /// Lowercase English name.
    pub fn name(self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Arabic => "arabic",
            Language::Chinese => "chinese",
            Language::German => "german",
            Language::Spanish => "spanish",
            Language::French => "french",
            Language::Hebrew => "hebrew",
            Language::Italian => "italian",
            Language::Japanese => "japanese",
            Language::Korean => "korean",
            Language::Dutch => "dutch",
            Language::Polish => "polish",
            Language::Portuguese => "portuguese",
            Language::Russian => "russian",
            Language::Turkish => "turkish",
            Language::Indonesian => "indonesian",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = EngineError;

    /// Accepts the code or the English name, case-insensitive.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_lowercase();
        Language::iter()
            .find(|lang| lang.code() == wanted || lang.name() == wanted)
            .ok_or_else(|| EngineError::invalid_language(format!("unsupported language {:?}", raw)))
    }
}
