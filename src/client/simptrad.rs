//! Simplified/traditional table download

use super::ApiClient;
use crate::error::Result;
use crate::simptrad::SimpleTradMap;
use tracing::info;

/// Plain endpoint serving the conversion table
const SIMPTRAD_ENDPOINT: &str = "simptradmap";

impl ApiClient {
    /// Download the simplified/traditional conversion table
    ///
    /// This is a plain request, not a batch job.
    pub async fn get_simple_trad_map(&self) -> Result<SimpleTradMap> {
        info!("getting simplified/traditional map");
        let body = self
            .send(self.get_request(self.endpoint(SIMPTRAD_ENDPOINT)))
            .await?;
        let map = SimpleTradMap::from_json(&body)?;
        info!(entries = map.num_entries(), "simplified/traditional map received");
        Ok(map)
    }
}
