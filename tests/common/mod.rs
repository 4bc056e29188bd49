#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use nutri_planner_rs::error::{NutriError, Result};
use nutri_planner_rs::models::{
    BlockedMealRegistry, CandidateMeal, Gender, Goal, LoggedMeal, SuggestionSet, UserProfile,
};
use nutri_planner_rs::source::{FetchPolicy, SuggestionSource};
use nutri_planner_rs::state::{
    EngineDeps, LocalFallbackStore, ManualClock, PersistenceGateway, SuggestionCache,
    SuggestionEngine, UserContextProvider,
};

pub const USER: &str = "user-1";

pub fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

pub fn meal(name: &str, calories: f64, category: &str) -> CandidateMeal {
    CandidateMeal {
        name: name.to_string(),
        calories,
        protein: 20.0,
        carbs: 40.0,
        fats: 10.0,
        category: category.to_string(),
        image: None,
        instructions: None,
        ingredients: Vec::new(),
    }
}

/// 70 kg, 175 cm, 30 years old on 2026-10-16, male, moderately active, maintaining.
/// Targets 2628 kcal.
pub fn scenario_a_profile() -> UserProfile {
    UserProfile {
        weight: Some(70.0),
        height: Some(175.0),
        birth_date: NaiveDate::from_ymd_opt(1996, 1, 10),
        gender: Some(Gender::Male),
        activity_level: Some(1.55),
        goal: Some(Goal::Maintain),
        goal_weight: None,
    }
}

/// A varied sample that fits every slot for the scenario A profile.
pub fn rich_sample() -> Vec<CandidateMeal> {
    let mut meals = Vec::new();
    for i in 0..8 {
        meals.push(meal(&format!("Pancakes {}", i), 350.0, "pastries"));
        meals.push(meal(&format!("Stew {}", i), 400.0, "main dishes"));
        meals.push(meal(&format!("Soup {}", i), 380.0, "soups"));
        meals.push(meal(&format!("Cookie {}", i), 120.0, "desserts"));
    }
    meals
}

/// Source returning a fixed sample, optionally after a delay.
pub struct StaticSource {
    meals: Vec<CandidateMeal>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(meals: Vec<CandidateMeal>) -> Self {
        Self {
            meals,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn slow(meals: Vec<CandidateMeal>, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(meals)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SuggestionSource for StaticSource {
    async fn fetch(&self, sample_size: usize) -> Result<Vec<CandidateMeal>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.meals.iter().take(sample_size).cloned().collect())
    }
}

/// In-memory durable store with switchable failures.
#[derive(Default)]
pub struct MemoryGateway {
    docs: Mutex<HashMap<(String, NaiveDate), SuggestionSet>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub writes: AtomicUsize,
}

impl MemoryGateway {
    pub fn get(&self, user_id: &str, date: NaiveDate) -> Option<SuggestionSet> {
        self.docs.lock().unwrap().get(&(user_id.to_string(), date)).cloned()
    }

    pub fn seed(&self, user_id: &str, set: SuggestionSet) {
        self.docs.lock().unwrap().insert((user_id.to_string(), set.date), set);
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn load_suggestions(&self, user_id: &str, date: NaiveDate) -> Result<Option<SuggestionSet>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(NutriError::PersistenceRead("offline".to_string()));
        }
        Ok(self.get(user_id, date))
    }

    async fn save_suggestions(&self, user_id: &str, set: &SuggestionSet) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(NutriError::PersistenceWrite("offline".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.seed(user_id, set.clone());
        Ok(())
    }
}

/// In-memory local store.
#[derive(Default)]
pub struct MemoryLocalStore {
    sets: Mutex<HashMap<(String, NaiveDate), SuggestionSet>>,
    pub writes: AtomicUsize,
}

impl MemoryLocalStore {
    pub fn get(&self, user_id: &str, date: NaiveDate) -> Option<SuggestionSet> {
        self.sets.lock().unwrap().get(&(user_id.to_string(), date)).cloned()
    }

    pub fn seed(&self, user_id: &str, set: SuggestionSet) {
        self.sets.lock().unwrap().insert((user_id.to_string(), set.date), set);
    }
}

#[async_trait]
impl LocalFallbackStore for MemoryLocalStore {
    async fn load(&self, user_id: &str, date: NaiveDate) -> Result<Option<SuggestionSet>> {
        Ok(self.get(user_id, date))
    }

    async fn save(&self, user_id: &str, set: &SuggestionSet, _today: NaiveDate) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.seed(user_id, set.clone());
        Ok(())
    }
}

pub struct FakeUser {
    pub profile: UserProfile,
    pub blocked: BlockedMealRegistry,
    pub logged: Vec<LoggedMeal>,
}

impl Default for FakeUser {
    fn default() -> Self {
        Self {
            profile: scenario_a_profile(),
            blocked: BlockedMealRegistry::default(),
            logged: Vec::new(),
        }
    }
}

#[async_trait]
impl UserContextProvider for FakeUser {
    fn user_id(&self) -> &str {
        USER
    }

    async fn profile(&self) -> Result<UserProfile> {
        Ok(self.profile.clone())
    }

    async fn blocked_meals(&self) -> Result<BlockedMealRegistry> {
        Ok(self.blocked.clone())
    }

    async fn logged_meals(&self, date: NaiveDate) -> Result<Vec<LoggedMeal>> {
        Ok(self
            .logged
            .iter()
            .filter(|m| m.timestamp.date() == date)
            .cloned()
            .collect())
    }
}

/// An engine plus handles on its collaborators.
pub struct Harness {
    pub engine: SuggestionEngine,
    pub source: Arc<StaticSource>,
    pub durable: Arc<MemoryGateway>,
    pub local: Arc<MemoryLocalStore>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(source: StaticSource) -> Self {
        Self::with_user(source, FakeUser::default())
    }

    pub fn with_user(source: StaticSource, user: FakeUser) -> Self {
        Self::with_stores(
            source,
            user,
            Arc::new(MemoryGateway::default()),
            Arc::new(MemoryLocalStore::default()),
        )
    }

    pub fn with_stores(
        source: StaticSource,
        user: FakeUser,
        durable: Arc<MemoryGateway>,
        local: Arc<MemoryLocalStore>,
    ) -> Self {
        let source = Arc::new(source);
        let clock = Arc::new(ManualClock::new(date(16)));
        let cache = SuggestionCache::new(durable.clone(), local.clone());
        let engine = SuggestionEngine::new(
            EngineDeps {
                source: source.clone(),
                cache,
                user: Arc::new(user),
                clock: clock.clone(),
            },
            FetchPolicy {
                timeout: Duration::from_secs(2),
                ..Default::default()
            },
        );

        Self {
            engine,
            source,
            durable,
            local,
            clock,
        }
    }
}
