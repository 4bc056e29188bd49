use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::debug;

use nutri_planner_rs::cli::{Cli, Command};
use nutri_planner_rs::config::Settings;
use nutri_planner_rs::error::Result;
use nutri_planner_rs::interface::{
    display_plan, display_targets, prompt_logged_meal, prompt_profile, prompt_yes_no,
};
use nutri_planner_rs::logging::init_logging;
use nutri_planner_rs::models::{CandidateMeal, MealSlot};
use nutri_planner_rs::planner::plan_slot_budgets;
use nutri_planner_rs::source::HttpSuggestionSource;
use nutri_planner_rs::state::{
    EngineDeps, JsonFileGateway, JsonFileLocalStore, JsonFileUserContext, SuggestionCache,
    SuggestionEngine, SystemClock, UserContextProvider,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    init_logging(&settings.logging);

    let user = Arc::new(JsonFileUserContext::new(&settings.storage.data_dir, &cli.user));
    let engine = build_engine(&settings, Arc::clone(&user))?;
    let command = cli.command.unwrap_or_default();
    debug!(?command, user = %cli.user, "Running command");

    match command {
        Command::Targets => cmd_targets(&engine).await,
        Command::Plan { date, refresh } => cmd_plan(&engine, date, refresh).await,
        Command::Regenerate { slot, index, date } => cmd_regenerate(&engine, slot, index, date).await,
        Command::Log { slot } => cmd_log(&engine, &user, slot).await,
        Command::Profile => cmd_profile(&user).await,
    }
}

fn build_engine(settings: &Settings, user: Arc<JsonFileUserContext>) -> Result<SuggestionEngine> {
    let source = HttpSuggestionSource::new(&settings.source.base_url, settings.source_timeout())?;
    let cache = SuggestionCache::new(
        Arc::new(JsonFileGateway::new(&settings.storage.data_dir)),
        Arc::new(JsonFileLocalStore::new(
            settings.storage.local_store_path(),
            settings.storage.local_retention_days,
        )),
    );

    Ok(SuggestionEngine::new(
        EngineDeps {
            source: Arc::new(source),
            cache,
            user,
            clock: Arc::new(SystemClock),
        },
        settings.fetch_policy(),
    ))
}

/// Show targets and slot budgets for the stored profile.
async fn cmd_targets(engine: &SuggestionEngine) -> Result<()> {
    let targets = engine.targets().await;
    display_targets(&targets, &plan_slot_budgets(targets.target_calories));
    Ok(())
}

/// Load or generate the plan for a day and show it.
async fn cmd_plan(engine: &SuggestionEngine, date: Option<NaiveDate>, refresh: bool) -> Result<()> {
    let date = date.unwrap_or_else(|| engine.today());

    let plan = if refresh {
        engine.refresh(date).await?
    } else {
        engine.open_date(date).await?
    };

    match plan {
        Some(plan) => {
            let logged = engine.logged_meals(date).await?;
            display_plan(&plan, &logged);
        }
        None => println!("Plan for {} was superseded.", date),
    }
    Ok(())
}

/// Replace one entry of a day's plan.
async fn cmd_regenerate(
    engine: &SuggestionEngine,
    slot: MealSlot,
    index: usize,
    date: Option<NaiveDate>,
) -> Result<()> {
    let date = date.unwrap_or_else(|| engine.today());
    engine.request_date(date);

    let plan = engine.regenerate(date, slot, index).await?;
    let logged = engine.logged_meals(date).await?;
    display_plan(&plan, &logged);
    Ok(())
}

/// Log a meal eaten today, matched against today's suggestions.
async fn cmd_log(
    engine: &SuggestionEngine,
    user: &JsonFileUserContext,
    slot: Option<MealSlot>,
) -> Result<()> {
    let today = engine.today();
    let plan = engine.open_date(today).await?;

    let suggestions: Vec<&CandidateMeal> = match &plan {
        Some(plan) => match slot {
            Some(slot) => plan.suggestions.slot(slot).iter().collect(),
            None => plan.suggestions.iter_slots().flat_map(|(_, meals)| meals.iter()).collect(),
        },
        None => Vec::new(),
    };

    let meal = prompt_logged_meal(&suggestions, slot, Local::now().naive_local())?;
    println!(
        "Logging '{}' ({:.0} kcal) for {}.",
        meal.name,
        meal.calories,
        meal.slot.map(|s| s.as_str()).unwrap_or("today")
    );

    if prompt_yes_no("Save this meal?", true)? {
        user.log_meal(meal).await?;
        println!("Meal logged.");
    }
    Ok(())
}

/// Edit the stored profile.
async fn cmd_profile(user: &JsonFileUserContext) -> Result<()> {
    let current = user.profile().await?;
    let updated = prompt_profile(&current)?;

    if updated == current {
        println!("Profile unchanged.");
        return Ok(());
    }

    if prompt_yes_no("Save profile?", true)? {
        user.save_profile(&updated).await?;
        println!("Profile saved. Run 'nutriplan targets' to see your new targets.");
    }
    Ok(())
}
