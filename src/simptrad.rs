//! Simplified/traditional character table
//!
//! The table maps single simplified characters to one or more traditional
//! forms. Conversion works one code point at a time; characters without an
//! entry are copied through unchanged.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Traditional form(s) of one simplified character
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MapEntry {
    /// Exactly one traditional form
    OneToOne(String),
    /// Several traditional forms, most common first
    OneToMany(Vec<String>),
}

impl MapEntry {
    /// Preferred traditional form
    pub fn first_mapping(&self) -> Option<&str> {
        match self {
            MapEntry::OneToOne(trad) => Some(trad),
            MapEntry::OneToMany(trads) => trads.first().map(String::as_str),
        }
    }

    /// Number of traditional forms
    pub fn num_mappings(&self) -> usize {
        match self {
            MapEntry::OneToOne(_) => 1,
            MapEntry::OneToMany(trads) => trads.len(),
        }
    }

    fn mappings(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            MapEntry::OneToOne(trad) => std::slice::from_ref(trad),
            MapEntry::OneToMany(trads) => trads,
        };
        slice.iter().map(String::as_str)
    }
}

#[derive(Deserialize)]
struct SimpTradMapPayload {
    #[serde(rename = "SimpTradMap")]
    map: BTreeMap<String, MapEntry>,
}

/// Conversion table between simplified and traditional characters
#[derive(Clone, Debug, Default)]
pub struct SimpleTradMap {
    entries: BTreeMap<String, MapEntry>,
    reverse: HashMap<String, String>,
}

impl SimpleTradMap {
    /// Build a table from its entries
    ///
    /// Fails when an entry lists no traditional form.
    pub fn new(entries: BTreeMap<String, MapEntry>) -> Result<Self> {
        if let Some((simp, _)) = entries.iter().find(|(_, e)| e.num_mappings() == 0) {
            return Err(Error::format(
                "simptradmap",
                format!("empty mappings array for {simp}"),
            ));
        }

        // first simplified key in key order wins
        let mut reverse = HashMap::new();
        for (simp, entry) in &entries {
            for trad in entry.mappings() {
                reverse
                    .entry(trad.to_string())
                    .or_insert_with(|| simp.clone());
            }
        }

        Ok(Self { entries, reverse })
    }

    /// Decode the body of the `simptradmap` endpoint
    pub fn from_json(body: &str) -> Result<Self> {
        let payload: SimpTradMapPayload =
            serde_json::from_str(body).map_err(|e| Error::format("simptradmap", e.to_string()))?;
        Self::new(payload.map)
    }

    /// Number of simplified characters in the table
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Number of traditional forms of `simplified`, 0 when unmapped
    pub fn num_mappings(&self, simplified: &str) -> usize {
        self.entries.get(simplified).map_or(0, MapEntry::num_mappings)
    }

    /// Convert simplified text to traditional, using each character's preferred form
    pub fn to_traditional(&self, simplified: &str) -> String {
        let mut buf = [0u8; 4];
        simplified
            .chars()
            .map(|c| {
                let key: &str = c.encode_utf8(&mut buf);
                self.entries
                    .get(key)
                    .and_then(MapEntry::first_mapping)
                    .map_or_else(|| c.to_string(), str::to_string)
            })
            .collect()
    }

    /// Convert traditional text to simplified
    pub fn to_simplified(&self, traditional: &str) -> String {
        let mut buf = [0u8; 4];
        traditional
            .chars()
            .map(|c| {
                let key: &str = c.encode_utf8(&mut buf);
                self.reverse.get(key).cloned().unwrap_or_else(|| c.to_string())
            })
            .collect()
    }
}
