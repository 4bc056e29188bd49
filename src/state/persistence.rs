use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::error::{NutriError, Result};
use crate::models::{BlockedMeal, BlockedMealRegistry, LoggedMeal, SuggestionSet, UserProfile};
use crate::planner::status::meals_on;

/// Primary, network-backed store: one document per (user, date).
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn load_suggestions(&self, user_id: &str, date: NaiveDate) -> Result<Option<SuggestionSet>>;

    async fn save_suggestions(&self, user_id: &str, set: &SuggestionSet) -> Result<()>;
}

/// On-device store used when the durable store is unreachable.
#[async_trait]
pub trait LocalFallbackStore: Send + Sync {
    async fn load(&self, user_id: &str, date: NaiveDate) -> Result<Option<SuggestionSet>>;

    /// Store `set` and evict entries that fell out of the retention window relative to `today`.
    async fn save(&self, user_id: &str, set: &SuggestionSet, today: NaiveDate) -> Result<()>;
}

/// Read access to the signed-in user's data.
#[async_trait]
pub trait UserContextProvider: Send + Sync {
    fn user_id(&self) -> &str;

    async fn profile(&self) -> Result<UserProfile>;

    async fn blocked_meals(&self) -> Result<BlockedMealRegistry>;

    /// Meals logged on `date`.
    async fn logged_meals(&self, date: NaiveDate) -> Result<Vec<LoggedMeal>>;
}

/// Read and parse a JSON file. A missing file is `Ok(None)`.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write JSON via a temp file and rename so readers never see partial documents.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

fn read_failure(path: &Path, e: NutriError) -> NutriError {
    NutriError::PersistenceRead(format!("{}: {}", path.display(), e))
}

fn write_failure(path: &Path, e: NutriError) -> NutriError {
    NutriError::PersistenceWrite(format!("{}: {}", path.display(), e))
}

/// Durable store kept as `<root>/durable/<user>/<date>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    root: PathBuf,
}

impl JsonFileGateway {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn document_path(&self, user_id: &str, date: NaiveDate) -> PathBuf {
        self.root
            .join("durable")
            .join(user_id)
            .join(format!("{}.json", date.format("%Y-%m-%d")))
    }
}

#[async_trait]
impl PersistenceGateway for JsonFileGateway {
    async fn load_suggestions(&self, user_id: &str, date: NaiveDate) -> Result<Option<SuggestionSet>> {
        let path = self.document_path(user_id, date);
        read_json(&path).await.map_err(|e| read_failure(&path, e))
    }

    async fn save_suggestions(&self, user_id: &str, set: &SuggestionSet) -> Result<()> {
        let path = self.document_path(user_id, set.date);
        write_json(&path, set).await.map_err(|e| write_failure(&path, e))?;
        debug!(user_id, date = %set.date, "Wrote durable suggestions");
        Ok(())
    }
}

/// On-disk layout of the local store: user -> date -> set.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LocalSnapshot {
    #[serde(default)]
    users: BTreeMap<String, BTreeMap<NaiveDate, SuggestionSet>>,
}

/// Local store kept as a single JSON file holding a bounded per-date history.
#[derive(Debug, Clone)]
pub struct JsonFileLocalStore {
    path: PathBuf,
    retention_days: i64,
}

impl JsonFileLocalStore {
    pub fn new<P: AsRef<Path>>(path: P, retention_days: u32) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            retention_days: i64::from(retention_days),
        }
    }

    async fn snapshot(&self) -> Result<LocalSnapshot> {
        Ok(read_json(&self.path)
            .await
            .map_err(|e| read_failure(&self.path, e))?
            .unwrap_or_default())
    }
}

#[async_trait]
impl LocalFallbackStore for JsonFileLocalStore {
    async fn load(&self, user_id: &str, date: NaiveDate) -> Result<Option<SuggestionSet>> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot
            .users
            .get(user_id)
            .and_then(|days| days.get(&date))
            .filter(|set| set.date == date)
            .cloned())
    }

    async fn save(&self, user_id: &str, set: &SuggestionSet, today: NaiveDate) -> Result<()> {
        // An unreadable snapshot is replaced rather than blocking the write.
        let mut snapshot = match self.snapshot().await {
            Ok(s) => s,
            Err(e) => {
                debug!(error = %e, "Discarding unreadable local snapshot");
                LocalSnapshot::default()
            }
        };

        let cutoff = today - Duration::days(self.retention_days);
        let days = snapshot.users.entry(user_id.to_string()).or_default();
        days.insert(set.date, set.clone());
        days.retain(|date, _| *date >= cutoff);

        write_json(&self.path, &snapshot)
            .await
            .map_err(|e| write_failure(&self.path, e))
    }
}

/// User data kept as JSON files under one directory:
/// `profile.json`, `blocked_meals.json`, `logged_meals.json`.
#[derive(Debug, Clone)]
pub struct JsonFileUserContext {
    root: PathBuf,
    user_id: String,
}

impl JsonFileUserContext {
    pub fn new<P: AsRef<Path>>(root: P, user_id: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            user_id: user_id.to_string(),
        }
    }

    fn profile_path(&self) -> PathBuf {
        self.root.join("profile.json")
    }

    fn blocked_path(&self) -> PathBuf {
        self.root.join("blocked_meals.json")
    }

    fn logged_path(&self) -> PathBuf {
        self.root.join("logged_meals.json")
    }

    pub async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        write_json(&self.profile_path(), profile).await
    }

    /// Append one entry to the meal log.
    pub async fn log_meal(&self, meal: LoggedMeal) -> Result<()> {
        let path = self.logged_path();
        let mut all: Vec<LoggedMeal> = read_json(&path).await?.unwrap_or_default();
        all.push(meal);
        write_json(&path, &all).await
    }
}

#[async_trait]
impl UserContextProvider for JsonFileUserContext {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    async fn profile(&self) -> Result<UserProfile> {
        Ok(read_json(&self.profile_path()).await?.unwrap_or_default())
    }

    async fn blocked_meals(&self) -> Result<BlockedMealRegistry> {
        let entries: Vec<BlockedMeal> = read_json(&self.blocked_path()).await?.unwrap_or_default();
        Ok(BlockedMealRegistry::from_entries(&entries))
    }

    async fn logged_meals(&self, date: NaiveDate) -> Result<Vec<LoggedMeal>> {
        let all: Vec<LoggedMeal> = read_json(&self.logged_path()).await?.unwrap_or_default();
        Ok(meals_on(&all, date))
    }
}
