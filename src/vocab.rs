//! Vocabulary records

use crate::types::null_as_default;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Language key of the English definition
pub const ENGLISH: &str = "en";

/// Fields requested for every vocab lookup
pub const VOCAB_FIELDS: [&str; 6] = [
    "id",
    "style",
    "reading",
    "writing",
    "definitions",
    "customDefinition",
];

/// Script a vocab's writing is stored in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum WritingStyle {
    /// Simplified characters
    #[serde(rename = "simp")]
    Simplified,
    /// Traditional characters
    #[serde(rename = "trad")]
    Traditional,
    /// Identical in both scripts
    #[serde(rename = "both")]
    Both,
}

impl WritingStyle {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            WritingStyle::Simplified => "simp",
            WritingStyle::Traditional => "trad",
            WritingStyle::Both => "both",
        }
    }
}

impl fmt::Display for WritingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WritingStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simp" => Ok(WritingStyle::Simplified),
            "trad" => Ok(WritingStyle::Traditional),
            "both" => Ok(WritingStyle::Both),
            other => Err(format!("Invalid WritingStyle: {other}")),
        }
    }
}

impl TryFrom<String> for WritingStyle {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A vocabulary entry as stored by Skritter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vocab {
    /// Vocab id, e.g. "zh-没关系-2"
    pub id: String,

    /// Language code
    #[serde(default)]
    pub lang: Option<String>,

    /// Priority
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: i64,

    /// Script of `writing`
    #[serde(rename = "style")]
    pub writing_style: WritingStyle,

    /// Audio file name
    #[serde(default)]
    pub audio: Option<String>,

    /// Toughness score
    #[serde(default, deserialize_with = "null_as_default")]
    pub toughness: i64,

    /// Creation timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: i64,

    /// Parts (rune, defn, rdng, tone) the user banned
    #[serde(default, deserialize_with = "null_as_default")]
    pub banned_parts: Vec<String>,

    /// Creator of a custom vocab
    #[serde(default)]
    pub creator: Option<String>,

    /// Record kind
    #[serde(default)]
    pub ilk: Option<String>,

    /// Characters
    #[serde(default, deserialize_with = "null_as_default")]
    pub writing: String,

    /// Audio URL
    #[serde(rename = "audioURL", default)]
    pub audio_url: Option<String>,

    /// Human-readable toughness
    #[serde(default)]
    pub toughness_string: Option<String>,

    /// Definitions keyed by language code
    #[serde(default, deserialize_with = "null_as_default")]
    pub definitions: BTreeMap<String, String>,

    /// User-supplied definition, preferred over `definitions` when present
    #[serde(default)]
    pub custom_definition: Option<String>,

    /// Starred by the user
    #[serde(default, deserialize_with = "null_as_default")]
    pub starred: bool,

    /// Numbered pinyin, e.g. "mei2guan1xi5"
    #[serde(default, deserialize_with = "null_as_default")]
    pub reading: String,
}

impl Vocab {
    /// Create a vocab from its essential attributes
    pub fn new(
        id: impl Into<String>,
        writing_style: WritingStyle,
        writing: impl Into<String>,
        reading: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            lang: None,
            priority: 0,
            writing_style,
            audio: None,
            toughness: 0,
            created: 0,
            banned_parts: Vec::new(),
            creator: None,
            ilk: None,
            writing: writing.into(),
            audio_url: None,
            toughness_string: None,
            definitions: BTreeMap::new(),
            custom_definition: None,
            starred: false,
            reading: reading.into(),
        }
    }

    /// Add a definition in the given language
    #[must_use]
    pub fn with_definition(mut self, language: impl Into<String>, definition: impl Into<String>) -> Self {
        self.definitions.insert(language.into(), definition.into());
        self
    }

    /// Set the user's custom definition
    #[must_use]
    pub fn with_custom_definition(mut self, definition: impl Into<String>) -> Self {
        self.custom_definition = Some(definition.into());
        self
    }

    /// Definition to export: the custom one if set, else the English one
    pub fn preferred_definition(&self) -> Option<&str> {
        self.custom_definition
            .as_deref()
            .or_else(|| self.definitions.get(ENGLISH).map(String::as_str))
    }
}

impl fmt::Display for Vocab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.writing,
            self.reading,
            self.definitions.get(ENGLISH).map(String::as_str).unwrap_or("")
        )
    }
}
