//! Placement engine: every grid mutation as a pure `&Course -> Course` function.
//!
//! Operations are total. An id that does not resolve (deleted card, stale drag
//! payload) yields a clone of the input, never an error.
//!
//! Rank inside a cell is the relative order of the cell's activities in the
//! global `activities` list. `move_activity` and `reorder` both edit that global
//! list, so one list encodes inter-cell and intra-cell order at the same time.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::CourseDefaults;
use crate::domain::{Activity, BloomLevel, Course, Demarche, IcapLevel, LearningType, Modality};
use crate::util::fill_template;

pub const DEFAULT_DURATION: u32 = 30;
pub const DEFAULT_TASK_TYPE: &str = "Individuel";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
  Up,
  Down,
}

/// What a drag carries when it ends over an empty part of a cell.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DropPayload {
  /// Dragged from the taxonomy palette.
  LearningType(LearningType),
  /// Dragged from an existing card.
  ActivityId(String),
}

/// Fields of `UpdateMeta`; `None` leaves the course field untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseMeta {
  #[serde(default)] pub title: Option<String>,
  #[serde(default)] pub description: Option<String>,
  #[serde(default)] pub target_audience: Option<String>,
}

/// A fresh activity with palette defaults and an id not already used in `course`.
pub fn new_activity(
  course: &Course,
  defaults: &CourseDefaults,
  kind: LearningType,
  week: u32,
  mode: Modality,
) -> Activity {
  Activity {
    id: fresh_id(course),
    kind,
    title: fill_template(&defaults.new_activity_title, &[("type", kind.label())]),
    description: String::new(),
    duration: DEFAULT_DURATION,
    mode,
    week,
    objectives: String::new(),
    task_type: DEFAULT_TASK_TYPE.into(),
    card_number: String::new(),
    material: String::new(),
    bloom_level: None,
    demarche: Demarche::Individual,
    icap_level: IcapLevel::Active,
  }
}

fn fresh_id(course: &Course) -> String {
  loop {
    let id = Uuid::new_v4().simple().to_string();
    if course.find(&id).is_none() {
      return id;
    }
  }
}

/// Appends a new activity at the end of the list, hence last in its cell.
/// Week 0 is not a grid column and leaves the course unchanged.
pub fn add(course: &Course, defaults: &CourseDefaults, kind: LearningType, week: u32, mode: Modality) -> Course {
  if week == 0 {
    debug!(target: "planner", ?kind, ?mode, "add ignored: week 0");
    return course.clone();
  }
  let activity = new_activity(course, defaults, kind, week, mode);
  append_all(course, vec![activity])
}

/// Appends a batch in one version. Activities whose id is already present,
/// or that repeat an id earlier in the batch, are skipped.
pub fn append_all(course: &Course, batch: Vec<Activity>) -> Course {
  let mut next = course.clone();
  for a in batch {
    if a.week == 0 || next.find(&a.id).is_some() {
      debug!(target: "planner", id = %a.id, week = a.week, "append skipped: duplicate id or week 0");
      continue;
    }
    next.activities.push(a);
  }
  next
}

/// Relocates `dragged_id` to cell `(week, mode)`.
///
/// With a resolvable `target_id` the dragged activity is spliced into the
/// global list immediately before the target. The insertion is list-global,
/// not cell-local: if the target sits in another cell than `(week, mode)`,
/// the dragged activity's rank in its new cell follows from where the target
/// happens to be in the list.
/// Without a target, or with one that does not resolve (including the dragged
/// activity itself), it is appended to the end of the list.
pub fn move_activity(course: &Course, dragged_id: &str, target_id: Option<&str>, week: u32, mode: Modality) -> Course {
  let Some(dragged_idx) = course.position(dragged_id) else {
    debug!(target: "planner", %dragged_id, "move ignored: unknown activity");
    return course.clone();
  };
  if week == 0 {
    return course.clone();
  }

  let mut activities = course.activities.clone();
  let mut item = activities.remove(dragged_idx);
  item.week = week;
  item.mode = mode;

  let target_idx = target_id.and_then(|t| activities.iter().position(|a| a.id == t));
  match target_idx {
    Some(idx) => activities.insert(idx, item),
    None => activities.push(item),
  }
  Course { activities, ..course.clone() }
}

/// Swaps the activity with its neighbour in the same cell. At the top (`Up`)
/// or bottom (`Down`) of its cell nothing changes.
pub fn reorder(course: &Course, id: &str, direction: Direction) -> Course {
  let Some(current_idx) = course.position(id) else {
    debug!(target: "planner", %id, "reorder ignored: unknown activity");
    return course.clone();
  };
  let act = &course.activities[current_idx];

  // Global indices of the cell, in rank order.
  let cell: Vec<usize> = course
    .activities
    .iter()
    .enumerate()
    .filter(|(_, a)| a.in_cell(act.week, act.mode))
    .map(|(i, _)| i)
    .collect();
  let Some(rank) = cell.iter().position(|&i| i == current_idx) else {
    return course.clone();
  };

  let other_idx = match direction {
    Direction::Up if rank > 0 => cell[rank - 1],
    Direction::Down if rank + 1 < cell.len() => cell[rank + 1],
    _ => return course.clone(),
  };

  let mut next = course.clone();
  next.activities.swap(current_idx, other_idx);
  next
}

/// Full replacement of the stored activity with the same id.
/// A replacement placed in week 0 is ignored, as for `add` and `move_activity`.
pub fn update(course: &Course, activity: Activity) -> Course {
  if activity.week == 0 {
    debug!(target: "planner", id = %activity.id, "update ignored: week 0");
    return course.clone();
  }
  let Some(idx) = course.position(&activity.id) else {
    debug!(target: "planner", id = %activity.id, "update ignored: unknown activity");
    return course.clone();
  };
  let mut next = course.clone();
  next.activities[idx] = activity;
  next
}

pub fn delete(course: &Course, id: &str) -> Course {
  let mut next = course.clone();
  next.activities.retain(|a| a.id != id);
  next
}

/// Empties the grid; title, audience and week count are kept.
/// Declining the confirmation is a full no-op.
pub fn reset(course: &Course, confirmed: bool) -> Course {
  if !confirmed {
    debug!(target: "planner", "reset declined");
    return course.clone();
  }
  Course { activities: Vec::new(), ..course.clone() }
}

/// Single-selection toggle: the selected tag clears itself, any other tag replaces it.
pub fn toggle_bloom_level(current: Option<BloomLevel>, level: BloomLevel) -> Option<BloomLevel> {
  if current == Some(level) { None } else { Some(level) }
}

pub fn select_bloom_level(course: &Course, id: &str, level: BloomLevel) -> Course {
  let Some(idx) = course.position(id) else {
    return course.clone();
  };
  let mut next = course.clone();
  let a = &mut next.activities[idx];
  a.bloom_level = toggle_bloom_level(a.bloom_level, level);
  next
}

/// Drag ended over a cell rather than a card.
pub fn drop_on_cell(course: &Course, defaults: &CourseDefaults, payload: &DropPayload, week: u32, mode: Modality) -> Course {
  match payload {
    DropPayload::LearningType(kind) => add(course, defaults, *kind, week, mode),
    DropPayload::ActivityId(id) => move_activity(course, id, None, week, mode),
  }
}

/// Drag of an existing card ended over another card: take the target's cell
/// and insert before it. Dropping a card on itself does nothing.
pub fn drop_on_card(course: &Course, dragged_id: &str, target_id: &str) -> Course {
  if dragged_id == target_id {
    return course.clone();
  }
  let Some(target) = course.find(target_id) else {
    return course.clone();
  };
  let (week, mode) = (target.week, target.mode);
  move_activity(course, dragged_id, Some(target_id), week, mode)
}

pub fn update_meta(course: &Course, meta: CourseMeta) -> Course {
  let mut next = course.clone();
  if let Some(t) = meta.title { next.title = t; }
  if let Some(d) = meta.description { next.description = d; }
  if let Some(a) = meta.target_audience { next.target_audience = a; }
  next
}

/// One more week column. The count never decreases.
pub fn add_week(course: &Course) -> Course {
  Course { num_weeks: course.num_weeks.saturating_add(1), ..course.clone() }
}
