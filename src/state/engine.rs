use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{NutriError, Result};
use crate::models::{DayPlan, LoggedMeal, MealSlot, NutritionTargets, SuggestionSet};
use crate::planner::calculations::{calculate_targets, plan_slot_budgets};
use crate::planner::constants::MAX_MEALS_PER_SLOT;
use crate::planner::selection::{build_suggestion_set, suggest_for_slot};
use crate::source::{fetch_sample, FetchPolicy, SuggestionSource};
use crate::state::cache::SuggestionCache;
use crate::state::clock::Clock;
use crate::state::persistence::UserContextProvider;

/// Lifecycle of one date's plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    Uninitialized,
    Loading,
    Ready,
}

#[derive(Debug, Clone)]
enum PlanState {
    Uninitialized,
    Loading,
    Ready(SuggestionSet),
}

/// Handle for one date request. Results are applied only while its token is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket {
    pub date: NaiveDate,
    pub token: u64,
}

#[derive(Debug, Default)]
struct RequestState {
    date: Option<NaiveDate>,
    token: u64,
}

struct Generated {
    set: SuggestionSet,
    fallback_used: bool,
    source_unavailable: bool,
}

type RegenKey = (NaiveDate, MealSlot, usize);

/// Marks a (date, slot, index) as being regenerated until dropped.
struct InFlightGuard {
    key: RegenKey,
    in_flight: Arc<Mutex<HashSet<RegenKey>>>,
}

impl InFlightGuard {
    fn acquire(in_flight: &Arc<Mutex<HashSet<RegenKey>>>, key: RegenKey) -> Option<Self> {
        if !lock(in_flight).insert(key) {
            return None;
        }
        Some(Self {
            key,
            in_flight: Arc::clone(in_flight),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.key);
        debug!(date = %self.key.0, slot = %self.key.1, index = self.key.2, "Released regeneration guard");
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Collaborators the engine needs.
#[derive(Clone)]
pub struct EngineDeps {
    pub source: Arc<dyn SuggestionSource>,
    pub cache: SuggestionCache,
    pub user: Arc<dyn UserContextProvider>,
    pub clock: Arc<dyn Clock>,
}

/// Daily meal suggestion engine for one signed-in user.
///
/// Owns the in-memory per-date plan state, collapses overlapping generations
/// for the same date onto one, discards results for dates the caller has
/// navigated away from, and serializes single-entry regenerations.
pub struct SuggestionEngine {
    source: Arc<dyn SuggestionSource>,
    cache: SuggestionCache,
    user: Arc<dyn UserContextProvider>,
    clock: Arc<dyn Clock>,
    policy: FetchPolicy,
    days: Mutex<HashMap<NaiveDate, PlanState>>,
    request: Mutex<RequestState>,
    generation_locks: Mutex<HashMap<NaiveDate, Arc<tokio::sync::Mutex<()>>>>,
    regenerating: Arc<Mutex<HashSet<RegenKey>>>,
}

impl SuggestionEngine {
    pub fn new(deps: EngineDeps, policy: FetchPolicy) -> Self {
        Self {
            source: deps.source,
            cache: deps.cache,
            user: deps.user,
            clock: deps.clock,
            policy,
            days: Mutex::new(HashMap::new()),
            request: Mutex::new(RequestState::default()),
            generation_locks: Mutex::new(HashMap::new()),
            regenerating: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Current targets from the stored profile. An unreadable profile uses defaults.
    pub async fn targets(&self) -> NutritionTargets {
        let profile = match self.user.profile().await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "Profile unavailable, using defaults");
                Default::default()
            }
        };
        calculate_targets(&profile, self.today())
    }

    pub async fn logged_meals(&self, date: NaiveDate) -> Result<Vec<LoggedMeal>> {
        self.user.logged_meals(date).await
    }

    pub fn status(&self, date: NaiveDate) -> PlanStatus {
        match lock(&self.days).get(&date) {
            None | Some(PlanState::Uninitialized) => PlanStatus::Uninitialized,
            Some(PlanState::Loading) => PlanStatus::Loading,
            Some(PlanState::Ready(_)) => PlanStatus::Ready,
        }
    }

    /// The in-memory plan for a date, if it is ready.
    pub fn current(&self, date: NaiveDate) -> Option<SuggestionSet> {
        match lock(&self.days).get(&date) {
            Some(PlanState::Ready(set)) => Some(set.clone()),
            _ => None,
        }
    }

    /// Point the engine at `date` (navigation or day rollover).
    ///
    /// A new token is issued only when the date actually changes, so repeated
    /// requests for the same date share one ticket.
    pub fn request_date(&self, date: NaiveDate) -> GenerationTicket {
        let (ticket, previous) = {
            let mut request = lock(&self.request);
            let previous = request.date.filter(|d| *d != date);
            if request.date != Some(date) {
                request.date = Some(date);
                request.token += 1;
            }
            let ticket = GenerationTicket {
                date,
                token: request.token,
            };
            (ticket, previous)
        };

        // Ready and in-flight dates keep their state; an idle date we moved off is dropped.
        let mut days = lock(&self.days);
        if let Some(previous) = previous {
            if matches!(days.get(&previous), Some(PlanState::Uninitialized)) {
                days.remove(&previous);
            }
        }
        days.entry(date).or_insert(PlanState::Uninitialized);
        ticket
    }

    /// Re-point the engine at the clock's current date.
    pub fn roll_over(&self) -> GenerationTicket {
        self.request_date(self.today())
    }

    pub fn is_current(&self, ticket: GenerationTicket) -> bool {
        let request = lock(&self.request);
        request.date == Some(ticket.date) && request.token == ticket.token
    }

    /// Request `date` and resolve its plan.
    pub async fn open_date(&self, date: NaiveDate) -> Result<Option<DayPlan>> {
        let ticket = self.request_date(date);
        self.resolve(ticket).await
    }

    /// Load or generate the plan for a ticket's date.
    ///
    /// Returns `Ok(None)` when the ticket went stale before the result could be
    /// applied; the result is then discarded and nothing is persisted.
    pub async fn resolve(&self, ticket: GenerationTicket) -> Result<Option<DayPlan>> {
        if !self.is_current(ticket) {
            debug!(date = %ticket.date, token = ticket.token, "Ticket stale before start");
            return Ok(None);
        }
        self.load_or_generate(ticket.date, Some(ticket), false).await
    }

    /// Throw away the plan for `date` and generate a fresh one.
    pub async fn refresh(&self, date: NaiveDate) -> Result<Option<DayPlan>> {
        let ticket = self.request_date(date);
        self.load_or_generate(date, Some(ticket), true).await
    }

    async fn load_or_generate(
        &self,
        date: NaiveDate,
        ticket: Option<GenerationTicket>,
        force: bool,
    ) -> Result<Option<DayPlan>> {
        if !force {
            if let Some(set) = self.current(date) {
                return Ok(Some(cached_plan(set)));
            }
        }

        let generation_lock = {
            let mut locks = lock(&self.generation_locks);
            Arc::clone(locks.entry(date).or_default())
        };
        let _generation = generation_lock.lock().await;

        // Whoever held the lock before us may have finished this date already.
        if !force {
            if let Some(set) = self.current(date) {
                debug!(%date, "Joined finished generation");
                return Ok(Some(cached_plan(set)));
            }
        }

        self.set_state(date, PlanState::Loading);
        let user_id = self.user.user_id().to_string();

        if !force {
            if let Some((set, tier)) = self.cache.read(&user_id, date).await {
                if !self.still_wanted(date, ticket) {
                    return Ok(None);
                }
                debug!(%date, ?tier, "Serving cached suggestions");
                self.set_state(date, PlanState::Ready(set.clone()));
                self.release_generation_lock(date);
                return Ok(Some(cached_plan(set)));
            }
        }

        let Generated {
            set,
            fallback_used,
            source_unavailable,
        } = match self.generate(date).await {
            Ok(generated) => generated,
            Err(e) => {
                self.reset_loading(date);
                return Err(e);
            }
        };

        if !self.still_wanted(date, ticket) {
            return Ok(None);
        }

        self.cache.write_through(&user_id, &set, self.today()).await;
        self.set_state(date, PlanState::Ready(set.clone()));
        self.release_generation_lock(date);

        Ok(Some(DayPlan {
            suggestions: set,
            fallback_used,
            source_unavailable,
            from_cache: false,
        }))
    }

    /// Check the ticket after an await; a stale result leaves the date uninitialized.
    fn still_wanted(&self, date: NaiveDate, ticket: Option<GenerationTicket>) -> bool {
        match ticket {
            Some(t) if !self.is_current(t) => {
                info!(%date, token = t.token, "Discarding stale suggestions");
                self.reset_loading(date);
                false
            }
            _ => true,
        }
    }

    fn set_state(&self, date: NaiveDate, state: PlanState) {
        lock(&self.days).insert(date, state);
    }

    /// Ready dates are served from memory, so their generation lock is no longer needed.
    /// Callers already waiting on it hold their own handle.
    fn release_generation_lock(&self, date: NaiveDate) {
        lock(&self.generation_locks).remove(&date);
    }

    fn reset_loading(&self, date: NaiveDate) {
        let mut days = lock(&self.days);
        if let Some(state @ PlanState::Loading) = days.get_mut(&date) {
            *state = PlanState::Uninitialized;
        }
    }

    async fn generate(&self, date: NaiveDate) -> Result<Generated> {
        let targets = self.targets().await;
        let budgets = plan_slot_budgets(targets.target_calories);
        let blocked = self.user.blocked_meals().await?;
        let sample = fetch_sample(self.source.as_ref(), &self.policy).await;

        let (set, fallback_used) =
            build_suggestion_set(date, &sample.meals, &budgets, &blocked, &mut rand::thread_rng());

        info!(
            %date,
            target_calories = targets.target_calories,
            sampled = sample.meals.len(),
            blocked = blocked.len(),
            fallback_used,
            source_unavailable = sample.unavailable,
            "Generated suggestions"
        );
        Ok(Generated {
            set,
            fallback_used,
            source_unavailable: sample.unavailable,
        })
    }

    /// Replace the entry at `index` of `slot` for `date`, leaving everything else as is.
    ///
    /// Every meal currently in the slot is excluded from the pool, so the
    /// replacement never duplicates its siblings. `index` may equal the slot's
    /// length to append, up to `MAX_MEALS_PER_SLOT`. While one request for a
    /// (date, slot, index) is running, further requests for it fail with
    /// `RegenerationInFlight`.
    pub async fn regenerate(&self, date: NaiveDate, slot: MealSlot, index: usize) -> Result<DayPlan> {
        if index >= MAX_MEALS_PER_SLOT {
            return Err(NutriError::SlotIndexOutOfRange { slot, index });
        }
        let _guard = InFlightGuard::acquire(&self.regenerating, (date, slot, index))
            .ok_or(NutriError::RegenerationInFlight { slot, index })?;

        let current = match self.current(date) {
            Some(set) => set,
            None => self
                .load_or_generate(date, None, false)
                .await?
                .map(|plan| plan.suggestions)
                .unwrap_or_else(|| SuggestionSet::empty(date)),
        };
        let entries = current.slot(slot);
        if index > entries.len() {
            return Err(NutriError::SlotIndexOutOfRange { slot, index });
        }

        let blocked = entries
            .iter()
            .fold(self.user.blocked_meals().await?, |blocked, meal| blocked.with_extra(&meal.name));

        let targets = self.targets().await;
        let band = plan_slot_budgets(targets.target_calories).band(slot);
        let sample = fetch_sample(self.source.as_ref(), &self.policy).await;
        let selection = suggest_for_slot(&sample.meals, slot, band, &blocked, &mut rand::thread_rng());

        let Some(replacement) = selection.meals.into_iter().next() else {
            warn!(%date, %slot, index, "No replacement available, keeping current entry");
            return Ok(DayPlan {
                suggestions: current,
                fallback_used: selection.used_fallback,
                source_unavailable: sample.unavailable,
                from_cache: false,
            });
        };

        // Splice into the latest in-memory set so concurrent edits to other entries survive.
        let updated = {
            let mut days = lock(&self.days);
            let mut set = match days.get(&date) {
                Some(PlanState::Ready(set)) => set.clone(),
                _ => current,
            };
            let entries = set.slot_mut(slot);
            if index < entries.len() {
                entries[index] = replacement.clone();
            } else {
                entries.push(replacement.clone());
            }
            days.insert(date, PlanState::Ready(set.clone()));
            set
        };

        info!(%date, %slot, index, meal = %replacement.name, fallback = selection.used_fallback, "Regenerated suggestion");

        let user_id = self.user.user_id().to_string();
        let today = self.today();
        self.cache.write_local(&user_id, &updated, today).await;
        self.cache.write_durable_best_effort(&user_id, &updated, today).await;

        Ok(DayPlan {
            suggestions: updated,
            fallback_used: selection.used_fallback,
            source_unavailable: sample.unavailable,
            from_cache: false,
        })
    }
}

fn cached_plan(set: SuggestionSet) -> DayPlan {
    DayPlan {
        suggestions: set,
        fallback_used: false,
        source_unavailable: false,
        from_cache: true,
    }
}
