//! The single in-memory course and its update-and-notify cycle.
//!
//! `apply` runs a pure placement function under the write lock and swaps the
//! whole `Course` value, so readers see either the old or the new version.
//! Changed versions are published on a broadcast channel; no-ops are not.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, instrument};

use crate::domain::Course;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CourseSnapshot {
  pub version: u64,
  pub course: Course,
}

struct Versioned {
  version: u64,
  course: Course,
}

#[derive(Clone)]
pub struct CourseStore {
  inner: Arc<RwLock<Versioned>>,
  tx: broadcast::Sender<CourseSnapshot>,
}

impl CourseStore {
  pub fn new(course: Course) -> Self {
    let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
    Self { inner: Arc::new(RwLock::new(Versioned { version: 0, course })), tx }
  }

  pub async fn snapshot(&self) -> CourseSnapshot {
    let g = self.inner.read().await;
    CourseSnapshot { version: g.version, course: g.course.clone() }
  }

  /// Produce the next course from the current one. Returns the resulting snapshot
  /// and whether it is a new version.
  #[instrument(level = "debug", skip(self, change), fields(%op))]
  pub async fn apply<F>(&self, op: &'static str, change: F) -> (CourseSnapshot, bool)
  where
    F: FnOnce(&Course) -> Course,
  {
    let mut g = self.inner.write().await;
    let next = change(&g.course);
    if next == g.course {
      debug!(target: "planner", %op, version = g.version, "no-op");
      return (CourseSnapshot { version: g.version, course: next }, false);
    }
    g.version += 1;
    g.course = next;
    let snap = CourseSnapshot { version: g.version, course: g.course.clone() };
    debug!(target: "planner", %op, version = snap.version, activities = snap.course.activities.len(), "course updated");
    // Err only means nobody is subscribed.
    let _ = self.tx.send(snap.clone());
    (snap, true)
  }

  pub fn subscribe(&self) -> broadcast::Receiver<CourseSnapshot> {
    self.tx.subscribe()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::CourseDefaults;
  use crate::domain::{LearningType, Modality};
  use crate::placement;

  #[tokio::test]
  async fn applied_change_bumps_version_and_notifies() {
    let d = CourseDefaults::default();
    let store = CourseStore::new(d.fresh_course());
    let mut rx = store.subscribe();

    let (snap, changed) = store
      .apply("add", |c| placement::add(c, &d, LearningType::Acquisition, 1, Modality::F2F))
      .await;
    assert!(changed);
    assert_eq!(snap.version, 1);
    assert_eq!(snap.course.activities.len(), 1);

    let pushed = rx.recv().await.unwrap();
    assert_eq!(pushed, snap);
    assert_eq!(store.snapshot().await, snap);
  }

  #[tokio::test]
  async fn no_op_keeps_version_and_stays_silent() {
    let d = CourseDefaults::default();
    let store = CourseStore::new(d.fresh_course());
    let mut rx = store.subscribe();

    let (snap, changed) = store.apply("delete", |c| placement::delete(c, "missing")).await;
    assert!(!changed);
    assert_eq!(snap.version, 0);
    assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
  }
}
