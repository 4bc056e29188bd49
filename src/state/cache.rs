use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::models::SuggestionSet;
use crate::state::persistence::{LocalFallbackStore, PersistenceGateway};

/// Which tier served a cached set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    Durable,
    Local,
}

/// What a write attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The set is dated before today and was not persisted.
    Skipped,
    Written { durable: bool, local: bool },
}

/// Two-tier, date-keyed persistence for a user's daily suggestions.
///
/// Reads try the durable store first and fall back to the local store. Read
/// failures are treated as misses and write failures are logged; neither is
/// returned to the caller.
#[derive(Clone)]
pub struct SuggestionCache {
    durable: Arc<dyn PersistenceGateway>,
    local: Arc<dyn LocalFallbackStore>,
}

impl SuggestionCache {
    pub fn new(durable: Arc<dyn PersistenceGateway>, local: Arc<dyn LocalFallbackStore>) -> Self {
        Self { durable, local }
    }

    pub async fn read(&self, user_id: &str, date: NaiveDate) -> Option<(SuggestionSet, CacheTier)> {
        match self.durable.load_suggestions(user_id, date).await {
            Ok(Some(set)) if set.date == date => {
                debug!(%date, "Durable cache hit");
                return Some((set, CacheTier::Durable));
            }
            Ok(_) => debug!(%date, "Durable cache miss"),
            Err(e) => warn!(%date, error = %e, "Durable read failed, trying local store"),
        }

        match self.local.load(user_id, date).await {
            Ok(Some(set)) if set.date == date => {
                debug!(%date, "Local cache hit");
                Some((set, CacheTier::Local))
            }
            Ok(_) => {
                debug!(%date, "Local cache miss");
                None
            }
            Err(e) => {
                warn!(%date, error = %e, "Local read failed");
                None
            }
        }
    }

    /// Persist to both tiers. Sets dated before `today` are never written.
    pub async fn write_through(&self, user_id: &str, set: &SuggestionSet, today: NaiveDate) -> WriteOutcome {
        if set.date < today {
            debug!(date = %set.date, %today, "Not persisting past-dated suggestions");
            return WriteOutcome::Skipped;
        }
        let durable = self.write_durable(user_id, set).await;
        let local = self.write_local_unchecked(user_id, set, today).await;
        WriteOutcome::Written { durable, local }
    }

    /// Persist to the local tier only, under the same date policy.
    pub async fn write_local(&self, user_id: &str, set: &SuggestionSet, today: NaiveDate) -> WriteOutcome {
        if set.date < today {
            return WriteOutcome::Skipped;
        }
        let local = self.write_local_unchecked(user_id, set, today).await;
        WriteOutcome::Written {
            durable: false,
            local,
        }
    }

    /// Best-effort durable write, under the same date policy.
    pub async fn write_durable_best_effort(&self, user_id: &str, set: &SuggestionSet, today: NaiveDate) -> bool {
        set.date >= today && self.write_durable(user_id, set).await
    }

    async fn write_durable(&self, user_id: &str, set: &SuggestionSet) -> bool {
        match self.durable.save_suggestions(user_id, set).await {
            Ok(()) => true,
            Err(e) => {
                warn!(date = %set.date, error = %e, "Durable write failed");
                false
            }
        }
    }

    async fn write_local_unchecked(&self, user_id: &str, set: &SuggestionSet, today: NaiveDate) -> bool {
        match self.local.save(user_id, set, today).await {
            Ok(()) => true,
            Err(e) => {
                warn!(date = %set.date, error = %e, "Local write failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::{NutriError, Result};
    use crate::models::MealSlot;
    use crate::planner::fallback_meals;

    #[derive(Default)]
    struct MemStore {
        sets: Mutex<HashMap<NaiveDate, SuggestionSet>>,
        failing: bool,
    }

    impl MemStore {
        fn failing() -> Self {
            Self {
                failing: true,
                ..Default::default()
            }
        }

        fn get(&self, date: NaiveDate) -> Option<SuggestionSet> {
            self.sets.lock().unwrap().get(&date).cloned()
        }

        fn put(&self, set: &SuggestionSet) -> Result<()> {
            if self.failing {
                return Err(NutriError::PersistenceWrite("offline".to_string()));
            }
            self.sets.lock().unwrap().insert(set.date, set.clone());
            Ok(())
        }

        fn fetch(&self, date: NaiveDate) -> Result<Option<SuggestionSet>> {
            if self.failing {
                return Err(NutriError::PersistenceRead("offline".to_string()));
            }
            Ok(self.get(date))
        }
    }

    #[async_trait]
    impl PersistenceGateway for MemStore {
        async fn load_suggestions(&self, _user_id: &str, date: NaiveDate) -> Result<Option<SuggestionSet>> {
            self.fetch(date)
        }

        async fn save_suggestions(&self, _user_id: &str, set: &SuggestionSet) -> Result<()> {
            self.put(set)
        }
    }

    #[async_trait]
    impl LocalFallbackStore for MemStore {
        async fn load(&self, _user_id: &str, date: NaiveDate) -> Result<Option<SuggestionSet>> {
            self.fetch(date)
        }

        async fn save(&self, _user_id: &str, set: &SuggestionSet, _today: NaiveDate) -> Result<()> {
            self.put(set)
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn set_for(d: u32) -> SuggestionSet {
        let mut set = SuggestionSet::empty(date(d));
        set.dinner = fallback_meals(MealSlot::Dinner);
        set
    }

    #[tokio::test]
    async fn test_past_date_write_is_skipped() {
        let durable = Arc::new(MemStore::default());
        let local = Arc::new(MemStore::default());
        let cache = SuggestionCache::new(durable.clone(), local.clone());

        assert_eq!(cache.write_through("u1", &set_for(15), date(16)).await, WriteOutcome::Skipped);
        assert_eq!(cache.write_local("u1", &set_for(15), date(16)).await, WriteOutcome::Skipped);
        assert!(!cache.write_durable_best_effort("u1", &set_for(15), date(16)).await);
        assert_eq!(durable.get(date(15)), None);
        assert_eq!(local.get(date(15)), None);
    }

    #[tokio::test]
    async fn test_write_through_reports_each_tier() {
        let cache = SuggestionCache::new(Arc::new(MemStore::default()), Arc::new(MemStore::default()));
        assert_eq!(
            cache.write_through("u1", &set_for(16), date(16)).await,
            WriteOutcome::Written {
                durable: true,
                local: true
            }
        );

        let offline = SuggestionCache::new(Arc::new(MemStore::failing()), Arc::new(MemStore::default()));
        assert_eq!(
            offline.write_through("u1", &set_for(17), date(16)).await,
            WriteOutcome::Written {
                durable: false,
                local: true
            }
        );
        assert_eq!(
            offline.write_local("u1", &set_for(17), date(16)).await,
            WriteOutcome::Written {
                durable: false,
                local: true
            }
        );
    }

    #[tokio::test]
    async fn test_read_falls_back_to_local_on_durable_error() {
        let local = Arc::new(MemStore::default());
        local.put(&set_for(16)).unwrap();
        let cache = SuggestionCache::new(Arc::new(MemStore::failing()), local);

        assert_eq!(cache.read("u1", date(16)).await, Some((set_for(16), CacheTier::Local)));
        assert_eq!(cache.read("u1", date(17)).await, None);
    }
}
