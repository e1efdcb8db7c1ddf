//! Static taxonomy registry: ABC activity types, ICAP levels, modality labels and colours.
//!
//! Pure reference data. Display text is French, matching the planner UI.

use serde::Serialize;

use crate::domain::{BloomLevel, IcapLevel, LearningType, Modality};

#[derive(Debug, Serialize)]
pub struct StructuredTask {
  pub title: &'static str,
  pub items: &'static [&'static str],
}

/// Card definition of one ABC learning type.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbcDefinition {
  #[serde(rename = "type")]
  pub kind: LearningType,
  pub color: &'static str,
  pub light_background_color: &'static str,
  pub description: &'static str,
  pub learner_role: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub trainer_role: Option<&'static str>,
  pub digital_tools: &'static [&'static str],
  pub structured_tasks: &'static [StructuredTask],
}

#[derive(Debug, Serialize)]
pub struct IcapDefinition {
  pub level: IcapLevel,
  pub color: &'static str,
  pub label: &'static str,
  pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ModalityDefinition {
  pub mode: Modality,
  pub label: &'static str,
  pub color: &'static str,
}

/// Everything the palette, legends and charts need, in one payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
  pub activity_types: Vec<&'static AbcDefinition>,
  pub icap_levels: Vec<&'static IcapDefinition>,
  pub modalities: Vec<&'static ModalityDefinition>,
  pub bloom_levels: Vec<BloomLevel>,
}

pub fn registry() -> Registry {
  Registry {
    activity_types: LearningType::ALL.into_iter().map(abc).collect(),
    icap_levels: IcapLevel::ALL.into_iter().map(icap).collect(),
    modalities: Modality::ALL.into_iter().map(modality).collect(),
    bloom_levels: BloomLevel::ALL.to_vec(),
  }
}

pub fn abc(kind: LearningType) -> &'static AbcDefinition {
  match kind {
    LearningType::Acquisition => &ABC_TYPES[0],
    LearningType::Investigation => &ABC_TYPES[1],
    LearningType::Practice => &ABC_TYPES[2],
    LearningType::Discussion => &ABC_TYPES[3],
    LearningType::Collaboration => &ABC_TYPES[4],
    LearningType::Production => &ABC_TYPES[5],
  }
}

pub fn icap(level: IcapLevel) -> &'static IcapDefinition {
  match level {
    IcapLevel::Passive => &ICAP_LEVELS[0],
    IcapLevel::Active => &ICAP_LEVELS[1],
    IcapLevel::Constructive => &ICAP_LEVELS[2],
    IcapLevel::Interactive => &ICAP_LEVELS[3],
  }
}

pub fn modality(mode: Modality) -> &'static ModalityDefinition {
  match mode {
    Modality::F2F => &MODALITIES[0],
    Modality::Sync => &MODALITIES[1],
    Modality::Async => &MODALITIES[2],
  }
}

static MODALITIES: [ModalityDefinition; 3] = [
  ModalityDefinition { mode: Modality::F2F, label: "Présentiel", color: "#0f172a" },
  ModalityDefinition { mode: Modality::Sync, label: "Distanciel synchrone", color: "#6366f1" },
  ModalityDefinition { mode: Modality::Async, label: "Distanciel asynchrone", color: "#10b981" },
];

static ICAP_LEVELS: [IcapDefinition; 4] = [
  IcapDefinition {
    level: IcapLevel::Passive,
    color: "#94a3b8",
    label: "Passif (Recevoir)",
    description: "L'apprenant reçoit l'information sans action spécifique (ex: écouter un cours magistral, regarder une vidéo sans interaction).",
  },
  IcapDefinition {
    level: IcapLevel::Active,
    color: "#3b82f6",
    label: "Actif (Manipuler)",
    description: "L'apprenant manipule l'information (ex: prendre des notes linéaires, surligner, mettre en pause une vidéo).",
  },
  IcapDefinition {
    level: IcapLevel::Constructive,
    color: "#6366f1",
    label: "Constructif (Générer)",
    description: "L'apprenant génère du contenu au-delà de l'information fournie (ex: synthétiser, créer un schéma, poser des questions).",
  },
  IcapDefinition {
    level: IcapLevel::Interactive,
    color: "#a855f7",
    label: "Interactif (Dialoguer)",
    description: "L'apprenant dialogue avec des pairs ou un expert pour co-construire (ex: débat, collaboration sur un projet, peer-learning).",
  },
];

static ABC_TYPES: [AbcDefinition; 6] = [
  AbcDefinition {
    kind: LearningType::Acquisition,
    color: "#06b6d4",
    light_background_color: "#ecfeff",
    description: "L'apprenant assimile de nouveaux contenus. C'est le mode classique de transmission de connaissances où l'on reçoit l'information de manière passive ou semi-active.",
    learner_role: "Mettre en lien des contenus avec ses connaissances et ses compétences pour en acquérir de nouvelles.",
    trainer_role: Some("Évaluer ou permettre l'auto-évaluation du niveau d'acquisition des contenus."),
    digital_tools: &["Magistère", "Page", "Livre", "Glossaire", "Course presentation (H5P)", "PodEduc", "Classe virtuelle", "Dossier"],
    structured_tasks: &[
      StructuredTask {
        title: "Consulter une ressource",
        items: &["Lire un document ou un article", "Écouter un podcast", "Visionner une vidéo, une animation"],
      },
      StructuredTask {
        title: "Assister à une présentation",
        items: &["Conférence", "Cours", "Webinaire", "Master classes", "Démonstrations"],
      },
    ],
  },
  AbcDefinition {
    kind: LearningType::Investigation,
    color: "#ef4444",
    light_background_color: "#fef2f2",
    description: "L'apprenant explore activement des ressources pour construire ses propres connaissances. Il doit comparer, analyser et critiquer les sources.",
    learner_role: "Analyser et comparer des ressources référencées en s'appuyant sur des recherches personnelles pertinentes.",
    trainer_role: Some("Faciliter une posture réflexive chez l'apprenant, questionner les choix."),
    digital_tools: &["Dossier", "Fichier", "PodEduc", "Moteurs de recherche", "Bases de données", "Bibliothèques numériques"],
    structured_tasks: &[
      StructuredTask {
        title: "Analyser un contenu",
        items: &[
          "Rechercher des exemples de pratique, les catégoriser, en faire une typologie",
          "Comparer des méthodes, des approches didactiques au regard de l'état de l'art, de la recherche et des prescriptions",
        ],
      },
      StructuredTask {
        title: "Analyser une pratique",
        items: &[
          "Prendre part à des mises en situation",
          "S'appuyer sur une grille pour les observer, prendre part à l'auto et l'allo-confrontation",
          "Interviewer un pair ou un expert",
        ],
      },
    ],
  },
  AbcDefinition {
    kind: LearningType::Practice,
    color: "#a855f7",
    light_background_color: "#faf5ff",
    description: "L'apprenant applique ses connaissances dans un contexte structuré. L'accent est mis sur l'action et le feedback immédiat.",
    learner_role: "Tester ses connaissances, ses compétences, considérant ses résultats, sa propre analyse et les rétroactions.",
    trainer_role: Some("Faciliter une posture réflexive chez l'apprenant, fournir des rétroactions."),
    digital_tools: &["H5P", "Simulateurs", "Test", "Paquetage Scorm"],
    structured_tasks: &[
      StructuredTask {
        title: "Pratiquer",
        items: &["Faire un exercice, une étude de cas", "Répondre à un quiz", "Concevoir un outil d'analyse", "Participer à un jeu de rôle"],
      },
      StructuredTask {
        title: "Présenter son travail",
        items: &["Rendre compte d'une visite, d'un stage", "Conduire un projet et le soutenir à l'oral"],
      },
    ],
  },
  AbcDefinition {
    kind: LearningType::Discussion,
    color: "#1e3a8a",
    light_background_color: "#eff6ff",
    description: "L'apprenant articule ses idées et les confronte à celles des autres. C'est un échange structuré.",
    learner_role: "Confronter ses idées, interroger celles des pairs et du(es) formateur(s).",
    trainer_role: Some("S'assurer en amont d'installer un cadre bienveillant de formation."),
    digital_tools: &["Forums", "Classe virtuelle", "Nuage de mots", "Commentaires"],
    structured_tasks: &[
      StructuredTask {
        title: "Interagir avec une ou plusieurs personnes",
        items: &[
          "Participer à un débat, à une classe virtuelle, à une interview",
          "Questionner, argumenter le choix d'outil, la pertinence d'une démarche",
        ],
      },
      StructuredTask {
        title: "Interagir avec un contenu",
        items: &[
          "Voter, répondre à un sondage",
          "Participer à un remue méninge, à un nuage de mots",
          "Participer à un fil de discussion sur un forum",
        ],
      },
    ],
  },
  AbcDefinition {
    kind: LearningType::Collaboration,
    color: "#fbbf24",
    light_background_color: "#fffbeb",
    description: "L'apprenant travaille avec ses pairs pour atteindre un objectif commun. Il y a une interdépendance positive.",
    learner_role: "Réaliser une production commune résultant d'un débat ou d'une mise en pratique.",
    trainer_role: Some("Questionner les choix opérés, stimuler ou réguler les interactions."),
    digital_tools: &["Wikis", "Glossaire", "Devoir", "Sticky Notes", "H5P"],
    structured_tasks: &[
      StructuredTask {
        title: "Contribuer à une production commune",
        items: &[
          "Planifier les tâches d'un projet",
          "Rédiger une synthèse",
          "Élaborer une grille d'analyse",
          "Concevoir et tester une démarche",
          "Corriger la production d'un tiers",
        ],
      },
      StructuredTask {
        title: "Interagir",
        items: &[
          "Participer à un remue méninge, à un nuage de mots",
          "Participer à un débat",
          "Participer à un fil de discussion sur un forum",
        ],
      },
    ],
  },
  AbcDefinition {
    kind: LearningType::Production,
    color: "#22c55e",
    light_background_color: "#f0fdf4",
    description: "L'apprenant crée un artefact qui témoigne de son apprentissage.",
    learner_role: "Consolider ses apprentissages en réalisant une production résultant de la compréhension des concepts, de leur mise en pratique.",
    trainer_role: Some("Questionner les choix opérés, fournir des rétroactions, des ressources référencées."),
    digital_tools: &["Logiciels de montage", "Devoir", "H5P", "Classe virtuelle"],
    structured_tasks: &[
      StructuredTask {
        title: "Réaliser une publication",
        items: &[
          "Rédiger un résumé, un article",
          "Réaliser un poster, un compte-rendu",
          "Construire une grille d'analyse, une fiche de mutualisation, une séquence",
        ],
      },
      StructuredTask {
        title: "Créer une ressource de référence",
        items: &["Créer et alimenter un glossaire", "Rédiger une synthèse", "Créer un diaporama, une capsule vidéo"],
      },
    ],
  },
];

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lookups_return_matching_entries() {
    for t in LearningType::ALL {
      assert_eq!(abc(t).kind, t);
    }
    for l in IcapLevel::ALL {
      assert_eq!(icap(l).level, l);
    }
    for m in Modality::ALL {
      assert_eq!(modality(m).mode, m);
    }
  }

  #[test]
  fn registry_serializes_contract_field_names() {
    let v = serde_json::to_value(registry()).unwrap();
    let first = &v["activityTypes"][0];
    assert_eq!(first["type"], "Acquisition");
    assert_eq!(first["lightBackgroundColor"], "#ecfeff");
    assert!(first["digitalTools"].as_array().is_some_and(|a| !a.is_empty()));
    assert_eq!(first["structuredTasks"][0]["title"], "Consulter une ressource");
    assert_eq!(v["icapLevels"].as_array().map(Vec::len), Some(4));
    assert_eq!(v["bloomLevels"][3], "Analyse");
  }
}
