//! Scenario generation: decode and validate the generator's reply before anything
//! reaches the course.
//!
//! Flow:
//! 1) `openai` returns the model's message text (untrusted).
//! 2) `decode_records` accepts a JSON array, or an object carrying one
//!    (`activities` first, else the first array-valued field).
//! 3) `validate_record` checks enum membership and week bounds per record and
//!    coerces the soft fields.
//! 4) The accepted activities are appended to the course as one batch.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::CourseDefaults;
use crate::domain::{Activity, Course, IcapLevel, LearningType, Modality};
use crate::openai::OpenAIError;
use crate::placement::{self, DEFAULT_DURATION, DEFAULT_TASK_TYPE};

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
  #[error("scenario generation is disabled (no OPENAI_API_KEY)")]
  Disabled,
  #[error(transparent)]
  Upstream(#[from] OpenAIError),
  #[error("generator reply is not a list of activities: {0}")]
  Malformed(String),
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Rejection {
  pub index: usize,
  pub reason: String,
}

/// Result of validating one generator reply against a course.
#[derive(Clone, Debug, Default)]
pub struct ValidatedBatch {
  pub received: usize,
  pub activities: Vec<Activity>,
  pub rejected: Vec<Rejection>,
}

pub fn decode_records(text: &str) -> Result<Vec<Value>, ScenarioError> {
  let root: Value = serde_json::from_str(text.trim()).map_err(|e| ScenarioError::Malformed(e.to_string()))?;
  match root {
    Value::Array(items) => Ok(items),
    Value::Object(mut map) => {
      if let Some(Value::Array(items)) = map.remove("activities") {
        return Ok(items);
      }
      map
        .into_iter()
        .find_map(|(_, v)| match v {
          Value::Array(items) => Some(items),
          _ => None,
        })
        .ok_or_else(|| ScenarioError::Malformed("object without an activity array".into()))
    }
    other => Err(ScenarioError::Malformed(format!("unexpected JSON {}", json_kind(&other)))),
  }
}

fn json_kind(v: &Value) -> &'static str {
  match v {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

/// Numbers, or numeric strings, as f64.
fn number(v: Option<&Value>) -> Option<f64> {
  let n = match v? {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  };
  n.filter(|f| f.is_finite())
}

fn text(v: Option<&Value>) -> Option<String> {
  v.and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

/// Strict on `type`, `mode` and `week`; lenient on everything else.
pub fn validate_record(
  record: &Value,
  weeks: u32,
  course: &Course,
  defaults: &CourseDefaults,
) -> Result<Activity, String> {
  let obj = record.as_object().ok_or_else(|| format!("record is a {}", json_kind(record)))?;

  let raw_type = obj.get("type").and_then(Value::as_str).unwrap_or_default();
  let kind = LearningType::from_label(raw_type).ok_or_else(|| format!("unknown type {raw_type:?}"))?;

  let raw_mode = obj.get("mode").and_then(Value::as_str).unwrap_or_default();
  let mode = Modality::from_label(raw_mode).ok_or_else(|| format!("unknown mode {raw_mode:?}"))?;

  let week = number(obj.get("week")).ok_or("missing or non-numeric week")?;
  if week.fract() != 0.0 || week < 1.0 || week > f64::from(weeks) {
    return Err(format!("week {week} outside 1..={weeks}"));
  }
  let week = week as u32;

  let icap_level = obj
    .get("icapLevel")
    .and_then(Value::as_str)
    .and_then(IcapLevel::from_label)
    .unwrap_or_default();

  let duration = number(obj.get("duration"))
    .filter(|d| *d >= 0.0)
    .map(|d| d.round().min(f64::from(u32::MAX)) as u32)
    .unwrap_or(DEFAULT_DURATION);

  let mut a = placement::new_activity(course, defaults, kind, week, mode);
  if let Some(t) = text(obj.get("title")) { a.title = t; }
  a.description = text(obj.get("description")).unwrap_or_default();
  a.objectives = text(obj.get("objectives")).unwrap_or_default();
  a.task_type = text(obj.get("taskType")).unwrap_or_else(|| DEFAULT_TASK_TYPE.into());
  a.duration = duration;
  a.icap_level = icap_level;
  Ok(a)
}

/// Decode + validate. A reply that does not decode is `Malformed`; bad records
/// inside a decodable reply are listed in `rejected`.
pub fn validate_reply(
  text: &str,
  weeks: u32,
  course: &Course,
  defaults: &CourseDefaults,
) -> Result<ValidatedBatch, ScenarioError> {
  let records = decode_records(text)?;
  let mut batch = ValidatedBatch { received: records.len(), ..Default::default() };
  for (index, r) in records.iter().enumerate() {
    match validate_record(r, weeks, course, defaults) {
      Ok(a) => batch.activities.push(a),
      Err(reason) => {
        debug!(target: "scenario", index, %reason, "generated record rejected");
        batch.rejected.push(Rejection { index, reason });
      }
    }
  }
  if !batch.rejected.is_empty() {
    warn!(target: "scenario", received = batch.received, rejected = batch.rejected.len(), "some generated records were rejected");
  }
  Ok(batch)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn ctx() -> (Course, CourseDefaults) {
    let d = CourseDefaults::default();
    (d.fresh_course(), d)
  }

  #[test]
  fn malformed_reply_is_an_error_not_a_panic() {
    let (c, d) = ctx();
    assert!(matches!(validate_reply("Sure! Here is your scenario:", 4, &c, &d), Err(ScenarioError::Malformed(_))));
    assert!(matches!(validate_reply("\"just a string\"", 4, &c, &d), Err(ScenarioError::Malformed(_))));
    assert!(matches!(validate_reply(r#"{"note":"none"}"#, 4, &c, &d), Err(ScenarioError::Malformed(_))));
  }

  #[test]
  fn array_and_wrapped_object_both_decode() {
    assert_eq!(decode_records(r#"[{"a":1},{"b":2}]"#).unwrap().len(), 2);
    assert_eq!(decode_records(r#"{"activities":[{"a":1}]}"#).unwrap().len(), 1);
    assert_eq!(decode_records(r#"{"scenario":[{"a":1},{},{}]}"#).unwrap().len(), 3);
  }

  #[test]
  fn well_formed_record_becomes_an_activity() {
    let (c, d) = ctx();
    let rec = json!({
      "type": "Enquête", "icapLevel": "Constructif", "title": "Veille",
      "description": "Comparer trois sources", "duration": 44.6, "mode": "Async",
      "week": 2, "objectives": "Évaluer une source", "taskType": "Peer-learning"
    });
    let a = validate_record(&rec, 4, &c, &d).unwrap();
    assert_eq!(a.kind, LearningType::Investigation);
    assert_eq!(a.icap_level, IcapLevel::Constructive);
    assert_eq!((a.week, a.mode, a.duration), (2, Modality::Async, 45));
    assert_eq!(a.title, "Veille");
    assert_eq!(a.task_type, "Peer-learning");
    assert!(!a.id.is_empty());
  }

  #[test]
  fn hard_fields_reject_and_soft_fields_coerce() {
    let (c, d) = ctx();
    let base = json!({"type": "Production", "mode": "F2F", "week": 1});

    let mut bad_type = base.clone();
    bad_type["type"] = json!("Lecture");
    assert!(validate_record(&bad_type, 4, &c, &d).unwrap_err().contains("type"));

    let mut bad_mode = base.clone();
    bad_mode["mode"] = json!("Hybrid");
    assert!(validate_record(&bad_mode, 4, &c, &d).is_err());

    for w in [json!(0), json!(5), json!(1.5), json!("soon")] {
      let mut bad_week = base.clone();
      bad_week["week"] = w;
      assert!(validate_record(&bad_week, 4, &c, &d).is_err());
    }

    let mut soft = base.clone();
    soft["icapLevel"] = json!("Hyperactive");
    soft["duration"] = json!(-10);
    let a = validate_record(&soft, 4, &c, &d).unwrap();
    assert_eq!(a.icap_level, IcapLevel::Active);
    assert_eq!(a.duration, DEFAULT_DURATION);
    assert_eq!(a.title, "New Production");
    assert_eq!(a.task_type, DEFAULT_TASK_TYPE);
  }

  #[test]
  fn batch_reports_rejections_by_index() {
    let (c, d) = ctx();
    let reply = r#"[
      {"type":"Acquisition","mode":"F2F","week":1,"duration":30},
      42,
      {"type":"Discussion","mode":"Sync","week":9}
    ]"#;
    let batch = validate_reply(reply, 4, &c, &d).unwrap();
    assert_eq!(batch.received, 3);
    assert_eq!(batch.activities.len(), 1);
    assert_eq!(batch.rejected.iter().map(|r| r.index).collect::<Vec<_>>(), vec![1, 2]);
  }
}
