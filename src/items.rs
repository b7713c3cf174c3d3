//! Item id helpers
//!
//! Skritter tracks one study item per vocab and skill. An item id embeds the
//! vocab id between a numeric user prefix and a skill suffix:
//! `"234179586-zh-没关系-2-rune"` belongs to vocab `"zh-没关系-2"`.

use crate::error::{Error, Result};
use crate::vocab::Vocab;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Suffix of definition items
pub const DEFINITION_SUFFIX: &str = "defn";
/// Suffix of writing items
pub const WRITING_SUFFIX: &str = "rune";
/// Suffix of reading items
pub const READING_SUFFIX: &str = "rdng";
/// Suffix of tone items
pub const TONE_SUFFIX: &str = "tone";

/// Keep the ids ending in `-<suffix>` for any of the wanted suffixes
pub fn filter_item_ids<S: AsRef<str>>(item_ids: &BTreeSet<String>, suffixes: &[S]) -> BTreeSet<String> {
    let endings: Vec<String> = suffixes.iter().map(|s| format!("-{}", s.as_ref())).collect();
    item_ids
        .iter()
        .filter(|id| endings.iter().any(|ending| id.ends_with(ending.as_str())))
        .cloned()
        .collect()
}

/// Extract the vocab ids embedded in item ids
///
/// Every item id must match `^[0-9]*-(zh-.*-[0-9])-<suffix>$` for at least
/// one of `suffixes`; the first id that matches none aborts the extraction.
pub fn item_ids_to_vocab_ids<S: AsRef<str>>(
    item_ids: &BTreeSet<String>,
    suffixes: &[S],
) -> Result<BTreeSet<String>> {
    let patterns = suffixes
        .iter()
        .map(|suffix| {
            let pattern = format!(r"^[0-9]*-(zh-.*-[0-9])-{}$", regex::escape(suffix.as_ref()));
            Regex::new(&pattern)
                .map_err(|e| Error::format(format!("item id suffix {}", suffix.as_ref()), e.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    item_ids
        .iter()
        .map(|item_id| {
            patterns
                .iter()
                .find_map(|p| p.captures(item_id))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| Error::format("item id", format!("vocab id not matched from {item_id}")))
        })
        .collect()
}

/// Drop every banned vocab from the set of vocab ids
pub fn remove_banned_vocab_ids(banned: &HashMap<String, Vocab>, vocab_ids: &mut BTreeSet<String>) {
    for id in banned.keys() {
        if vocab_ids.remove(id) {
            debug!(vocab_id = %id, "removing banned vocab");
        }
    }
}
