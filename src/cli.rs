use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::models::MealSlot;

/// NutriPlan: daily calorie targets and meal suggestions from your profile.
#[derive(Parser, Debug)]
#[command(name = "nutriplan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the TOML config file (defaults to $NUTRIPLAN_CONFIG or nutriplan.toml).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// User whose plans are read and written.
    #[arg(short, long, global = true, default_value = "local")]
    pub user: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show daily targets and per-slot calorie bands.
    Targets,

    /// Show the meal plan for a day, generating it if needed.
    Plan {
        /// Day to plan (YYYY-MM-DD). Defaults to today.
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Discard the stored plan and generate a new one.
        #[arg(long)]
        refresh: bool,
    },

    /// Replace one suggestion of a day's plan.
    Regenerate {
        /// Meal slot (breakfast, lunch, dinner, snacks).
        slot: MealSlot,

        /// Position within the slot (0 or 1).
        index: usize,

        /// Day to edit (YYYY-MM-DD). Defaults to today.
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Log a meal you ate today.
    Log {
        /// Slot to log against.
        #[arg(short, long)]
        slot: Option<MealSlot>,
    },

    /// Edit your profile interactively.
    Profile,
}

impl Default for Command {
    fn default() -> Self {
        Command::Plan {
            date: None,
            refresh: false,
        }
    }
}
