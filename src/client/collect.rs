//! Chunked collection and per-domain aggregation
//!
//! Each caller-facing lookup runs one or more batch cycles and merges the
//! sub-request payloads with its own rule:
//! - vocab lookup appends into a list, one cycle per chunk of ids
//! - item discovery unions into a set and tolerates duplicates
//! - banned lookup inserts into a map and rejects duplicates

use super::ApiClient;
use crate::config::ChunkStrategy;
use crate::error::{Error, Result};
use crate::types::{BannedVocabsParams, ItemsParams, ItemsPayload, VocabsParams, VocabsPayload};
use crate::vocab::{VOCAB_FIELDS, Vocab};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Spawner path of the vocab resource
pub const VOCABS_PATH: &str = "api/v0/vocabs";

/// Spawner path of the item resource
pub const ITEMS_PATH: &str = "api/v0/items";

/// Sort key selecting the user's banned vocabs
const BANNED_SORT: &str = "banned";

impl ApiClient {
    /// Split `ids` into chunks and collect the results of each
    ///
    /// Chunks hold at most `chunk_size` ids, keep the input order, and cover
    /// every id exactly once. With [`ChunkStrategy::Sequential`] the next
    /// chunk starts only after the previous one has finished. The first
    /// failing chunk aborts the collection; no partial result is returned.
    pub async fn collect_chunked<'a, T, F, Fut>(
        &self,
        ids: &'a [String],
        mut fetch_chunk: F,
    ) -> Result<Vec<T>>
    where
        F: FnMut(&'a [String]) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let chunk_size = self.batch.chunk_size.max(1);
        let mut results = Vec::new();

        match self.batch.chunk_strategy {
            ChunkStrategy::Sequential => {
                for (index, chunk) in ids.chunks(chunk_size).enumerate() {
                    let start = index * chunk_size;
                    debug!(start, end = start + chunk.len(), "collecting chunk");
                    results.extend(fetch_chunk(chunk).await?);
                }
            }
        }

        Ok(results)
    }

    /// Look up vocabs by id
    ///
    /// The result holds every vocab returned by every sub-request, in chunk
    /// order. The input set guarantees no duplicates across chunks.
    pub async fn get_vocabs(&self, vocab_ids: &BTreeSet<String>) -> Result<Vec<Vocab>> {
        info!(count = vocab_ids.len(), "getting vocabs");
        let ids: Vec<String> = vocab_ids.iter().cloned().collect();
        let vocabs = self
            .collect_chunked(&ids, |chunk| self.fetch_vocab_chunk(chunk))
            .await?;
        info!(count = vocabs.len(), "vocabs received");
        Ok(vocabs)
    }

    async fn fetch_vocab_chunk(&self, ids: &[String]) -> Result<Vec<Vocab>> {
        let params = VocabsParams {
            ids: ids.join("|"),
            fields: VOCAB_FIELDS.join(","),
        };

        let mut vocabs = Vec::with_capacity(ids.len());
        for request in self.run_batch(VOCABS_PATH, params).await? {
            if let Some(payload) = request.into_payload::<VocabsPayload>()? {
                vocabs.extend(payload.vocabs);
            }
        }
        Ok(vocabs)
    }

    /// Look up the user's banned vocabs, keyed by vocab id
    ///
    /// A vocab id reported twice is an invariant violation.
    pub async fn get_banned_vocabs(&self) -> Result<HashMap<String, Vocab>> {
        info!("getting banned vocabs");
        let params = BannedVocabsParams {
            sort: BANNED_SORT.to_string(),
        };

        let mut banned = HashMap::new();
        for request in self.run_batch(VOCABS_PATH, params).await? {
            let Some(payload) = request.into_payload::<VocabsPayload>()? else {
                continue;
            };
            for vocab in payload.vocabs {
                match banned.entry(vocab.id.clone()) {
                    Entry::Occupied(entry) => {
                        return Err(Error::Invariant(format!(
                            "Duplicate banned vocab id: {}",
                            entry.key()
                        )));
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(vocab);
                    }
                }
            }
        }

        info!(count = banned.len(), "banned vocabs received");
        Ok(banned)
    }

    /// Discover the ids of every item the user has studied
    ///
    /// The service pages the listing into further sub-requests of the same
    /// job. An id seen on more than one page is logged and kept once.
    pub async fn get_item_ids(&self, limit: Option<u64>) -> Result<BTreeSet<String>> {
        info!(?limit, "getting item ids");
        let params = ItemsParams {
            ids_only: "true".to_string(),
            include_vocabs: "false".to_string(),
            limit,
            fields: None,
        };

        let mut item_ids = BTreeSet::new();
        for request in self.run_batch(ITEMS_PATH, params).await? {
            let Some(payload) = request.into_payload::<ItemsPayload>()? else {
                continue;
            };
            for item in payload.items {
                if item_ids.contains(&item.id) {
                    warn!(item_id = %item.id, "duplicate item id");
                } else {
                    item_ids.insert(item.id);
                }
            }
        }

        info!(count = item_ids.len(), "item ids received");
        Ok(item_ids)
    }
}
