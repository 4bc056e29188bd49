use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{NutriError, Result};
use crate::models::{CandidateMeal, RawCandidateMeal};
use crate::source::SuggestionSource;

#[derive(Debug, Deserialize)]
struct RandomRecipesResponse {
    #[serde(default)]
    meals: Vec<RawCandidateMeal>,
}

/// Recipe corpus client for `GET {base}/recipes/random?limit=N`.
#[derive(Debug, Clone)]
pub struct HttpSuggestionSource {
    client: Client,
    base_url: String,
}

impl HttpSuggestionSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn random_url(&self) -> String {
        format!("{}/recipes/random", self.base_url)
    }
}

#[async_trait]
impl SuggestionSource for HttpSuggestionSource {
    async fn fetch(&self, sample_size: usize) -> Result<Vec<CandidateMeal>> {
        let url = self.random_url();
        debug!(%url, sample_size, "Requesting random recipes");

        let response = self
            .client
            .get(&url)
            .query(&[("limit", sample_size)])
            .send()
            .await?
            .error_for_status()?;

        let body: RandomRecipesResponse = response.json().await?;
        let raw_count = body.meals.len();
        let meals: Vec<CandidateMeal> = body
            .meals
            .into_iter()
            .filter_map(RawCandidateMeal::normalize)
            .collect();

        if meals.is_empty() {
            return Err(NutriError::SourceUnavailable(format!(
                "empty result ({} raw entries)",
                raw_count
            )));
        }

        Ok(meals)
    }
}
