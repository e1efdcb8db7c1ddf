//! Loading planner configuration (course defaults + scenario prompts) from TOML.
//!
//! See `PlannerConfig`, `CourseDefaults` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{info, error};

use crate::domain::Course;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PlannerConfig {
  #[serde(default)]
  pub course: CourseDefaults,
  #[serde(default)]
  pub prompts: Prompts,
}

/// Values used whenever a fresh course or a fresh activity is created.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CourseDefaults {
  pub title: String,
  pub num_weeks: u32,
  /// Title given to activities created from the palette; `{type}` is the type label.
  pub new_activity_title: String,
}

impl Default for CourseDefaults {
  fn default() -> Self {
    Self {
      title: "New training course".into(),
      num_weeks: 4,
      new_activity_title: "New {type}".into(),
    }
  }
}

impl CourseDefaults {
  pub fn fresh_course(&self) -> Course {
    Course::new(self.title.clone(), self.num_weeks)
  }
}

/// Prompts used by the OpenAI client for scenario generation.
/// Placeholders: `{topic}`, `{audience}`, `{weeks}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub scenario_system: String,
  pub scenario_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      scenario_system: "You are an instructional designer using the ABC Learning Design method and the ICAP engagement framework. Respond ONLY with strict JSON.".into(),
      scenario_user_template: "Generate a complete learning scenario for a course on \"{topic}\" for \"{audience}\". The course lasts {weeks} weeks. Propose 2 to 3 activities per week.\n\
Return JSON {\"activities\": [...]} where each activity has:\n\
- type: one of Acquisition, Enquête, Entraînement, Discussion, Collaboration, Production\n\
- icapLevel: one of Passif, Actif, Constructif, Interactif\n\
- mode: one of F2F, Sync, Async\n\
- week: integer from 1 to {weeks}\n\
- duration: minutes (number)\n\
- title, description, objectives: strings\n\
- taskType: string (Individuel, Collaboratif, Peer-learning, ...)".into(),
    }
  }
}

pub fn parse_planner_config(s: &str) -> Result<PlannerConfig, toml::de::Error> {
  toml::from_str::<PlannerConfig>(s)
}

/// Attempt to load `PlannerConfig` from PLANNER_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_planner_config_from_env() -> Option<PlannerConfig> {
  let path = std::env::var("PLANNER_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_planner_config(&s) {
      Ok(cfg) => {
        info!(target: "abc_planner_backend", %path, num_weeks = cfg.course.num_weeks, "Loaded planner config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "abc_planner_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "abc_planner_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_file_yields_defaults() {
    let cfg = parse_planner_config("").unwrap();
    assert_eq!(cfg.course.num_weeks, 4);
    assert_eq!(cfg.course.new_activity_title, "New {type}");
    assert!(cfg.prompts.scenario_user_template.contains("{topic}"));
  }

  #[test]
  fn partial_sections_keep_remaining_defaults() {
    let cfg = parse_planner_config(
      r#"
      [course]
      title = "Nouveau Projet de Formation"
      new_activity_title = "Nouveau {type}"

      [prompts]
      scenario_system = "Réponds en JSON."
      "#,
    )
    .unwrap();
    assert_eq!(cfg.course.title, "Nouveau Projet de Formation");
    assert_eq!(cfg.course.num_weeks, 4);
    assert_eq!(cfg.prompts.scenario_system, "Réponds en JSON.");
    assert!(cfg.prompts.scenario_user_template.contains("{weeks}"));
  }

  #[test]
  fn fresh_course_never_has_zero_weeks() {
    let defaults = CourseDefaults { num_weeks: 0, ..CourseDefaults::default() };
    let c = defaults.fresh_course();
    assert_eq!(c.num_weeks, 1);
    assert!(c.activities.is_empty());
  }
}
