//! Domain models: the two taxonomies, modality, the `Activity` record and the `Course` aggregate.
//!
//! Wire labels follow the planner UI (French), English names are accepted as aliases on input.

use serde::{Deserialize, Serialize};

/// ABC learning type of an activity.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LearningType {
  Acquisition,
  #[serde(rename = "Enquête", alias = "Investigation", alias = "Enquete")]
  Investigation,
  #[serde(rename = "Entraînement", alias = "Practice", alias = "Entrainement")]
  Practice,
  Discussion,
  Collaboration,
  Production,
}

impl LearningType {
  /// Registry order; charts and the palette iterate in this order.
  pub const ALL: [LearningType; 6] = [
    LearningType::Acquisition,
    LearningType::Investigation,
    LearningType::Practice,
    LearningType::Discussion,
    LearningType::Collaboration,
    LearningType::Production,
  ];

  pub fn label(self) -> &'static str {
    match self {
      LearningType::Acquisition => "Acquisition",
      LearningType::Investigation => "Enquête",
      LearningType::Practice => "Entraînement",
      LearningType::Discussion => "Discussion",
      LearningType::Collaboration => "Collaboration",
      LearningType::Production => "Production",
    }
  }

  /// Lenient lookup used on untrusted input (generator output, drop payloads).
  pub fn from_label(raw: &str) -> Option<Self> {
    let key = fold_label(raw);
    Self::ALL.into_iter().find(|t| {
      let english = match t {
        LearningType::Investigation => "investigation",
        LearningType::Practice => "practice",
        _ => "",
      };
      fold_label(t.label()) == key || english == key
    })
  }
}

/// ICAP engagement level.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum IcapLevel {
  #[serde(rename = "Passif", alias = "Passive")]
  Passive,
  #[default]
  #[serde(rename = "Actif", alias = "Active")]
  Active,
  #[serde(rename = "Constructif", alias = "Constructive")]
  Constructive,
  #[serde(rename = "Interactif", alias = "Interactive")]
  Interactive,
}

impl IcapLevel {
  pub const ALL: [IcapLevel; 4] = [
    IcapLevel::Passive,
    IcapLevel::Active,
    IcapLevel::Constructive,
    IcapLevel::Interactive,
  ];

  pub fn label(self) -> &'static str {
    match self {
      IcapLevel::Passive => "Passif",
      IcapLevel::Active => "Actif",
      IcapLevel::Constructive => "Constructif",
      IcapLevel::Interactive => "Interactif",
    }
  }

  pub fn from_label(raw: &str) -> Option<Self> {
    let key = fold_label(raw);
    Self::ALL.into_iter().find(|l| {
      let english = match l {
        IcapLevel::Passive => "passive",
        IcapLevel::Active => "active",
        IcapLevel::Constructive => "constructive",
        IcapLevel::Interactive => "interactive",
      };
      fold_label(l.label()) == key || english == key
    })
  }
}

/// Delivery modality (one grid row).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modality {
  F2F,
  Sync,
  Async,
}

impl Modality {
  pub const ALL: [Modality; 3] = [Modality::F2F, Modality::Sync, Modality::Async];

  /// Accepts the wire codes and the human labels the generator tends to echo back.
  pub fn from_label(raw: &str) -> Option<Self> {
    match fold_label(raw).as_str() {
      "f2f" | "presentiel" | "face-to-face" | "face to face" => Some(Modality::F2F),
      "sync" | "synchrone" | "distanciel synchrone" | "synchronous" => Some(Modality::Sync),
      "async" | "asynchrone" | "distanciel asynchrone" | "asynchronous" => Some(Modality::Async),
      _ => None,
    }
  }
}

/// Bloom cognitive level. An activity carries at most one.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BloomLevel {
  #[serde(rename = "Mémorisation", alias = "Remember")]
  Remember,
  #[serde(rename = "Compréhension", alias = "Understand")]
  Understand,
  #[serde(rename = "Application", alias = "Apply")]
  Apply,
  #[serde(rename = "Analyse", alias = "Analyze")]
  Analyze,
  #[serde(rename = "Évaluation", alias = "Evaluate")]
  Evaluate,
  #[serde(rename = "Création", alias = "Create")]
  Create,
}

impl BloomLevel {
  pub const ALL: [BloomLevel; 6] = [
    BloomLevel::Remember,
    BloomLevel::Understand,
    BloomLevel::Apply,
    BloomLevel::Analyze,
    BloomLevel::Evaluate,
    BloomLevel::Create,
  ];
}

/// Individual or collective work mode.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Demarche {
  #[default]
  #[serde(rename = "Individuelle", alias = "Individual")]
  Individual,
  #[serde(rename = "Collective")]
  Collective,
}

/// One plannable unit of instruction, placed at `(week, mode)`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: LearningType,
  #[serde(default)] pub title: String,
  #[serde(default)] pub description: String,
  pub duration: u32, // minutes
  pub mode: Modality,
  pub week: u32,
  #[serde(default)] pub objectives: String,
  #[serde(default)] pub task_type: String,
  #[serde(default)] pub card_number: String,
  #[serde(default)] pub material: String,
  #[serde(default)] pub bloom_level: Option<BloomLevel>,
  #[serde(default)] pub demarche: Demarche,
  #[serde(default)] pub icap_level: IcapLevel,
}

impl Activity {
  pub fn in_cell(&self, week: u32, mode: Modality) -> bool {
    self.week == week && self.mode == mode
  }
}

/// The aggregate root. Never mutated in place by the store; see `store::CourseStore`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub target_audience: String,
  pub num_weeks: u32,
  #[serde(default)] pub activities: Vec<Activity>,
}

impl Course {
  pub fn new(title: impl Into<String>, num_weeks: u32) -> Self {
    Self {
      title: title.into(),
      description: String::new(),
      target_audience: String::new(),
      num_weeks: num_weeks.max(1),
      activities: Vec::new(),
    }
  }

  pub fn find(&self, id: &str) -> Option<&Activity> {
    self.activities.iter().find(|a| a.id == id)
  }

  pub fn position(&self, id: &str) -> Option<usize> {
    self.activities.iter().position(|a| a.id == id)
  }

  /// Activities of one grid cell, in within-cell rank order.
  pub fn cell(&self, week: u32, mode: Modality) -> impl Iterator<Item = &Activity> {
    self.activities.iter().filter(move |a| a.in_cell(week, mode))
  }
}

/// Lowercase, trim, and strip the French accents used by the labels above.
fn fold_label(raw: &str) -> String {
  raw
    .trim()
    .chars()
    .map(|c| match c {
      'é' | 'è' | 'ê' | 'É' | 'È' | 'Ê' => 'e',
      'î' | 'ï' | 'Î' => 'i',
      'â' | 'à' | 'Â' | 'À' => 'a',
      _ => c,
    })
    .flat_map(char::to_lowercase)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn labels_parse_in_both_languages() {
    assert_eq!(LearningType::from_label("Enquête"), Some(LearningType::Investigation));
    assert_eq!(LearningType::from_label(" investigation "), Some(LearningType::Investigation));
    assert_eq!(LearningType::from_label("ENTRAINEMENT"), Some(LearningType::Practice));
    assert_eq!(LearningType::from_label("Lecture"), None);
    assert_eq!(IcapLevel::from_label("interactive"), Some(IcapLevel::Interactive));
    assert_eq!(IcapLevel::from_label("Passif"), Some(IcapLevel::Passive));
    assert_eq!(Modality::from_label("Distanciel asynchrone"), Some(Modality::Async));
    assert_eq!(Modality::from_label("hybrid"), None);
  }

  #[test]
  fn activity_serializes_with_ui_field_names() {
    let a = Activity {
      id: "a1".into(),
      kind: LearningType::Practice,
      title: "Quiz".into(),
      description: String::new(),
      duration: 20,
      mode: Modality::Async,
      week: 2,
      objectives: String::new(),
      task_type: "Individuel".into(),
      card_number: String::new(),
      material: String::new(),
      bloom_level: Some(BloomLevel::Analyze),
      demarche: Demarche::Collective,
      icap_level: IcapLevel::Constructive,
    };
    let v = serde_json::to_value(&a).unwrap();
    assert_eq!(v["type"], "Entraînement");
    assert_eq!(v["taskType"], "Individuel");
    assert_eq!(v["bloomLevel"], "Analyse");
    assert_eq!(v["icapLevel"], "Constructif");
    assert_eq!(v["demarche"], "Collective");
    assert_eq!(v["mode"], "Async");

    let back: Activity = serde_json::from_value(v).unwrap();
    assert_eq!(back, a);
  }

  #[test]
  fn activity_defaults_apply_on_sparse_input() {
    let a: Activity = serde_json::from_str(
      r#"{"id":"x","type":"Investigation","duration":30,"mode":"F2F","week":1}"#,
    )
    .unwrap();
    assert_eq!(a.kind, LearningType::Investigation);
    assert_eq!(a.icap_level, IcapLevel::Active);
    assert_eq!(a.demarche, Demarche::Individual);
    assert!(a.bloom_level.is_none());
  }
}
