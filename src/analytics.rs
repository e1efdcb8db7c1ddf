//! Derived analytics: read-only projections of the activity list.
//!
//! Recomputed on every read. Every aggregate is a plain sum/count, so the
//! output does not depend on list order, and an empty list gives zeros.

use serde::Serialize;

use crate::domain::{Activity, Course, IcapLevel, LearningType, Modality};
use crate::taxonomy;
use crate::util::format_hours_minutes;

#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
  pub count: usize,
  pub total_duration: u64,
}

impl Tally {
  fn of<'a>(activities: impl Iterator<Item = &'a Activity>) -> Self {
    activities.fold(Tally::default(), |t, a| Tally {
      count: t.count + 1,
      total_duration: t.total_duration + u64::from(a.duration),
    })
  }
}

pub fn total_duration(activities: &[Activity]) -> u64 {
  activities.iter().map(|a| u64::from(a.duration)).sum()
}

pub fn by_icap_level(activities: &[Activity]) -> Vec<(IcapLevel, Tally)> {
  IcapLevel::ALL
    .into_iter()
    .map(|l| (l, Tally::of(activities.iter().filter(|a| a.icap_level == l))))
    .collect()
}

pub fn by_modality(activities: &[Activity]) -> Vec<(Modality, Tally)> {
  Modality::ALL
    .into_iter()
    .map(|m| (m, Tally::of(activities.iter().filter(|a| a.mode == m))))
    .collect()
}

pub fn duration_by_type(activities: &[Activity]) -> Vec<(LearningType, u64)> {
  LearningType::ALL
    .into_iter()
    .map(|t| {
      let d = activities.iter().filter(|a| a.kind == t).map(|a| u64::from(a.duration)).sum();
      (t, d)
    })
    .collect()
}

/// Flat record consumed by the chart widgets.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ChartPoint {
  pub name: &'static str,
  pub value: usize,
  pub duration: u64,
  pub color: &'static str,
}

/// Radar chart input.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePoint {
  #[serde(rename = "type")]
  pub kind: LearningType,
  pub duration: u64,
  pub full_mark: u32,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
  pub activity_count: usize,
  pub total_duration: u64,
  pub total_duration_label: String,
  pub icap: Vec<ChartPoint>,
  pub modality: Vec<ChartPoint>,
  pub abc: Vec<ChartPoint>,
  pub profile: Vec<ProfilePoint>,
}

pub fn analytics(activities: &[Activity]) -> Analytics {
  let total = total_duration(activities);

  let icap = by_icap_level(activities)
    .into_iter()
    .map(|(l, t)| ChartPoint {
      name: l.label(),
      value: t.count,
      duration: t.total_duration,
      color: taxonomy::icap(l).color,
    })
    .collect();

  let modality = by_modality(activities)
    .into_iter()
    .map(|(m, t)| {
      let def = taxonomy::modality(m);
      ChartPoint { name: def.label, value: t.count, duration: t.total_duration, color: def.color }
    })
    .collect();

  let per_type = duration_by_type(activities);
  let abc = per_type
    .iter()
    .map(|&(k, d)| ChartPoint {
      name: k.label(),
      value: activities.iter().filter(|a| a.kind == k).count(),
      duration: d,
      color: taxonomy::abc(k).color,
    })
    .collect();
  let profile = per_type
    .into_iter()
    .map(|(kind, duration)| ProfilePoint { kind, duration, full_mark: 100 })
    .collect();

  Analytics {
    activity_count: activities.len(),
    total_duration: total,
    total_duration_label: format_hours_minutes(total),
    icap,
    modality,
    abc,
    profile,
  }
}

// ---- Summary report ----

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeekGroup {
  pub week: u32,
  pub total_duration: u64,
  pub activities: Vec<Activity>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseReport {
  pub title: String,
  pub description: String,
  pub target_audience: String,
  pub num_weeks: u32,
  pub total_duration: u64,
  pub total_duration_label: String,
  /// Non-empty weeks of `1..=num_weeks`, ascending.
  pub weeks: Vec<WeekGroup>,
  /// Activities whose week lies beyond `num_weeks`; hidden from the grid.
  pub out_of_range: Vec<Activity>,
}

/// Activities partitioned by week, each group in list order.
pub fn group_by_week(activities: &[Activity], num_weeks: u32) -> Vec<WeekGroup> {
  (1..=num_weeks)
    .filter_map(|week| {
      let acts: Vec<Activity> = activities.iter().filter(|a| a.week == week).cloned().collect();
      if acts.is_empty() {
        return None;
      }
      Some(WeekGroup { week, total_duration: total_duration(&acts), activities: acts })
    })
    .collect()
}

pub fn report(course: &Course) -> CourseReport {
  let total = total_duration(&course.activities);
  CourseReport {
    title: course.title.clone(),
    description: course.description.clone(),
    target_audience: course.target_audience.clone(),
    num_weeks: course.num_weeks,
    total_duration: total,
    total_duration_label: format_hours_minutes(total),
    weeks: group_by_week(&course.activities, course.num_weeks),
    out_of_range: course.activities.iter().filter(|a| a.week > course.num_weeks).cloned().collect(),
  }
}
