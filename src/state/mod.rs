mod cache;
mod clock;
mod engine;
mod persistence;

pub use cache::{CacheTier, SuggestionCache, WriteOutcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{EngineDeps, GenerationTicket, PlanStatus, SuggestionEngine};
pub use persistence::{
    JsonFileGateway, JsonFileLocalStore, JsonFileUserContext, LocalFallbackStore,
    PersistenceGateway, UserContextProvider,
};
