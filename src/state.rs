//! Application state: the course store, course defaults, prompts, and the optional OpenAI client.
//!
//! This module owns:
//!   - the `CourseStore` (single in-memory course + change notifications)
//!   - the defaults used for fresh courses and activities (from TOML or built-in)
//!   - the prompts struct (from TOML or defaults)
//!   - optional OpenAI client

use tracing::{info, instrument};

use crate::config::{load_planner_config_from_env, CourseDefaults, PlannerConfig, Prompts};
use crate::openai::OpenAI;
use crate::store::CourseStore;

#[derive(Clone)]
pub struct AppState {
    pub store: CourseStore,
    pub defaults: CourseDefaults,
    pub prompts: Prompts,
    pub openai: Option<OpenAI>,
}

impl AppState {
    /// Build state from env: load config, create the starting course, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_planner_config_from_env().unwrap_or_default();

        // Build optional OpenAI client (if API key present).
        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "abc_planner_backend", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
        } else {
            info!(target: "abc_planner_backend", "OpenAI disabled (no OPENAI_API_KEY). Scenario generation will add nothing.");
        }

        Self::from_config(cfg, openai)
    }

    pub fn from_config(cfg: PlannerConfig, openai: Option<OpenAI>) -> Self {
        let course = cfg.course.fresh_course();
        info!(target: "planner", title = %course.title, num_weeks = course.num_weeks, "Starting with a fresh course");
        Self {
            store: CourseStore::new(course),
            defaults: cfg.course,
            prompts: cfg.prompts,
            openai,
        }
    }
}
