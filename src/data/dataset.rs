//! Remote report dataset.
//!
//! The reports come from a Socrata endpoint that speaks GeoJSON. The query is
//! bounded: the row limit is capped at [`MAX_RECORDS`] both in the request and
//! on the decoded response.

use crate::{
    core::constants::{DATASET_FILTER, DATASET_URL, MAX_RECORDS},
    data::{geojson::FeatureCollection, http},
    traits::DatasetSource,
    Result,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Where and how to query the dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub url: String,
    /// SoQL `$where` clause
    pub filter: Option<String>,
    /// Row limit, at most [`MAX_RECORDS`]
    pub limit: usize,
}

impl DatasetConfig {
    /// Limit actually sent, capped at [`MAX_RECORDS`]
    pub fn effective_limit(&self) -> usize {
        self.limit.min(MAX_RECORDS)
    }

    /// Query string pairs for the request
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(filter) = &self.filter {
            pairs.push(("$where", filter.clone()));
        }
        pairs.push(("$limit", self.effective_limit().to_string()));
        pairs
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            url: DATASET_URL.to_string(),
            filter: Some(DATASET_FILTER.to_string()),
            limit: MAX_RECORDS,
        }
    }
}

/// Socrata GeoJSON endpoint
#[derive(Debug, Clone)]
pub struct SocrataDataset {
    config: DatasetConfig,
}

impl SocrataDataset {
    pub fn new(config: DatasetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }
}

impl Default for SocrataDataset {
    fn default() -> Self {
        Self::new(DatasetConfig::default())
    }
}

#[async_trait]
impl DatasetSource for SocrataDataset {
    async fn fetch(&self) -> Result<FeatureCollection> {
        log::debug!(
            "fetching dataset {} (limit {})",
            self.config.url,
            self.config.effective_limit()
        );

        let request = http::HTTP_CLIENT
            .get(&self.config.url)
            .query(&self.config.query_pairs());
        let mut collection: FeatureCollection = http::get_json(request).await?;

        let limit = self.config.effective_limit();
        if collection.len() > limit {
            log::warn!(
                "dataset returned {} records, keeping the first {}",
                collection.len(),
                limit
            );
            collection.features.truncate(limit);
        }

        log::info!("fetched {} records", collection.len());
        Ok(collection)
    }
}

/// Dataset held in memory, for offline runs and tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataset {
    collection: FeatureCollection,
}

impl InMemoryDataset {
    pub fn new(collection: FeatureCollection) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl DatasetSource for InMemoryDataset {
    async fn fetch(&self) -> Result<FeatureCollection> {
        let mut collection = self.collection.clone();
        collection.features.truncate(MAX_RECORDS);
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query() {
        let config = DatasetConfig::default();
        assert_eq!(
            config.query_pairs(),
            vec![
                (
                    "$where",
                    "_251_feces_needles_condoms_y_n_where_y_none >= 0".to_string()
                ),
                ("$limit", "10000".to_string()),
            ]
        );
    }

    #[test]
    fn test_limit_is_capped() {
        let config = DatasetConfig {
            limit: 50_000,
            filter: None,
            ..Default::default()
        };
        assert_eq!(config.effective_limit(), 10_000);
        assert_eq!(config.query_pairs(), vec![("$limit", "10000".to_string())]);
    }
}
