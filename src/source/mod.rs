mod http;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{NutriError, Result};
use crate::models::CandidateMeal;
use crate::planner::constants::DEFAULT_SAMPLE_SIZE;

pub use http::HttpSuggestionSource;

/// External provider of random candidate meals.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Fetch a random sample of up to `sample_size` normalized candidates.
    ///
    /// Implementations report an empty result as `SourceUnavailable`.
    async fn fetch(&self, sample_size: usize) -> Result<Vec<CandidateMeal>>;
}

/// How the engine calls a `SuggestionSource`.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub sample_size: usize,
    /// Upper bound for a single attempt.
    pub timeout: Duration,
    /// Extra attempts after the first failure. 0 falls back immediately.
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each further retry.
    pub retry_backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            timeout: Duration::from_secs(10),
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Outcome of a bounded fetch. Failures are folded into an empty sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    pub meals: Vec<CandidateMeal>,
    pub unavailable: bool,
}

/// Fetch a sample under `policy`, never failing.
///
/// Timeouts, transport errors, bad payloads and empty results are all treated
/// the same way: logged, retried if the policy allows, and finally returned as
/// an empty sample flagged `unavailable`.
pub async fn fetch_sample(source: &dyn SuggestionSource, policy: &FetchPolicy) -> Sample {
    let mut backoff = policy.retry_backoff;

    for attempt in 0..=policy.max_retries {
        if attempt > 0 {
            tokio::time::sleep(backoff).await;
            backoff = backoff.saturating_mul(2);
        }

        let result = match tokio::time::timeout(policy.timeout, source.fetch(policy.sample_size)).await {
            Ok(result) => result,
            Err(_) => Err(NutriError::SourceUnavailable(format!(
                "timed out after {:?}",
                policy.timeout
            ))),
        };

        match result {
            Ok(meals) if !meals.is_empty() => {
                debug!(count = meals.len(), attempt, "Fetched candidate sample");
                return Sample {
                    meals,
                    unavailable: false,
                };
            }
            Ok(_) => warn!(attempt, "Suggestion source returned no meals"),
            Err(e) => warn!(attempt, error = %e, "Suggestion source failed"),
        }
    }

    Sample {
        meals: Vec::new(),
        unavailable: true,
    }
}
