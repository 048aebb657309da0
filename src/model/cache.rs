//! Memoised model fits keyed by dataset fingerprint and model configuration
//!
//! A model is refitted only when the history or the hyper-parameters change.
//! Callers that replace the history should [`ModelCache::invalidate`] the old
//! fingerprint so stale fits do not accumulate.

use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use super::{fit, FeatureSchema, FittedModel, ModelConfig};
use crate::data::HistoricalDataset;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    fingerprint: u64,
    schema: FeatureSchema,
    params: [u64; 4],
}

impl CacheKey {
    /// Only the active schema's hyper-parameters take part in the key
    fn new(fingerprint: u64, config: &ModelConfig) -> Self {
        let params = match config.schema {
            FeatureSchema::Ridge5 => [config.ridge.alpha.to_bits(), 0, 0, 0],
            FeatureSchema::ElasticNet6 => {
                let en = &config.elastic_net;
                [en.alpha.to_bits(), en.l1_ratio.to_bits(), en.max_iter as u64, en.tol.to_bits()]
            }
        };
        Self { fingerprint, schema: config.schema, params }
    }
}

#[derive(Debug, Default)]
pub struct ModelCache {
    models: HashMap<CacheKey, Arc<FittedModel>>,
    hits: u64,
    misses: u64,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached fit for this dataset and config, fitting on a miss
    pub fn get_or_fit(&mut self, dataset: &HistoricalDataset, config: &ModelConfig) -> Result<Arc<FittedModel>> {
        let key = CacheKey::new(dataset.fingerprint(), config);
        if let Some(model) = self.models.get(&key) {
            self.hits += 1;
            debug!("Model cache hit for {} ({:016x})", config.schema, key.fingerprint);
            return Ok(Arc::clone(model));
        }

        self.misses += 1;
        let model = Arc::new(fit(dataset, config)?);
        self.models.insert(key, Arc::clone(&model));
        Ok(model)
    }

    /// Drop every fit trained on the dataset with this fingerprint.
    /// Returns the number of models removed.
    pub fn invalidate(&mut self, fingerprint: u64) -> usize {
        let before = self.models.len();
        self.models.retain(|key, _| key.fingerprint != fingerprint);
        before - self.models.len()
    }

    pub fn clear(&mut self) {
        self.models.clear();
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
