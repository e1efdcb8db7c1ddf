//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::analytics::{Analytics, CourseReport};
use crate::domain::{Activity, BloomLevel, Course, Modality};
use crate::placement::Direction;
use crate::scenario::Rejection;
use crate::store::CourseSnapshot;
use crate::taxonomy::Registry;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    GetCourse,
    GetAnalytics,
    GetReport,
    GetTaxonomy,
    AddActivity {
        #[serde(rename = "learningType")]
        learning_type: String,
        week: u32,
        mode: Modality,
    },
    Drop {
        #[serde(flatten)]
        drop: DropIn,
    },
    MoveActivity {
        id: String,
        #[serde(default, rename = "targetId")]
        target_id: Option<String>,
        week: u32,
        mode: Modality,
    },
    ReorderActivity {
        id: String,
        direction: Direction,
    },
    UpdateActivity {
        activity: Activity,
    },
    DeleteActivity {
        id: String,
    },
    SelectBloomLevel {
        id: String,
        level: BloomLevel,
    },
    UpdateCourse {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default, rename = "targetAudience")]
        target_audience: Option<String>,
    },
    AddWeek,
    ResetMatrix {
        #[serde(default)]
        confirm: bool,
    },
    NewCourse {
        #[serde(default)]
        confirm: bool,
    },
    GenerateScenario {
        #[serde(flatten)]
        request: ScenarioIn,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    /// Reply to a command, or a push after another client's change.
    Course {
        version: u64,
        course: Course,
    },
    Analytics {
        analytics: Analytics,
    },
    Report {
        report: CourseReport,
    },
    Taxonomy {
        taxonomy: Registry,
    },
    Scenario {
        outcome: ScenarioOut,
    },
    Error {
        message: String,
    },
}

impl From<CourseSnapshot> for ServerWsMessage {
    fn from(s: CourseSnapshot) -> Self {
        ServerWsMessage::Course { version: s.version, course: s.course }
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct AddIn {
    #[serde(rename = "learningType", alias = "type")]
    pub learning_type: String,
    pub week: u32,
    pub mode: Modality,
}

/// A drag that ended somewhere on the grid. Mirrors the browser's dataTransfer:
/// `learningType` comes from the palette, `activityId` from a card, `targetId`
/// names the card it was dropped on (if any).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropIn {
    #[serde(default)]
    pub learning_type: Option<String>,
    #[serde(default)]
    pub activity_id: Option<String>,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default)]
    pub mode: Option<Modality>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveIn {
    #[serde(default)]
    pub target_id: Option<String>,
    pub week: u32,
    pub mode: Modality,
}

#[derive(Debug, Deserialize)]
pub struct ReorderIn {
    pub direction: Direction,
}

#[derive(Debug, Deserialize)]
pub struct BloomIn {
    pub level: BloomLevel,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmIn {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScenarioIn {
    pub topic: String,
    #[serde(default)]
    pub audience: String,
    /// Defaults to the course's current week count.
    #[serde(default)]
    pub weeks: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOut {
    pub received: usize,
    pub added: usize,
    pub rejected: Vec<Rejection>,
    /// Why nothing was added, when that is the case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub version: u64,
    pub course: Course,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
