//! Entity reconciliation: robot snapshots into the scene.
//!
//! Reconciliation is additive. Every robot in a snapshot gets its body and
//! direction marker upserted; robots missing from a snapshot keep their
//! entities until an explicit clear.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::api::FleetApi;
use crate::models::RobotSnapshot;
use crate::result::ResultExt;
use crate::scene::{SceneModel, Upsert};
use crate::scheduler::{PollTask, TickGuard};

/// Scene shared between the reconciler, the session and presenters.
pub type SharedScene = Arc<RwLock<SceneModel>>;

/// Counts of what one reconciliation pass did to the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Entities created on first sighting.
    pub created: usize,
    /// Entities moved in place.
    pub updated: usize,
    /// Upserts refused because the key belongs to a locked entity or an
    /// entity of another kind.
    pub refused: usize,
}

impl ReconcileReport {
    fn record(&mut self, outcome: Upsert) {
        match outcome {
            Upsert::Created => self.created = self.created.saturating_add(1),
            Upsert::Updated => self.updated = self.updated.saturating_add(1),
            Upsert::Locked | Upsert::KindMismatch => self.refused = self.refused.saturating_add(1),
        }
    }
}

/// Apply one snapshot: body first, then marker, for every robot.
pub fn reconcile(scene: &mut SceneModel, snapshot: &RobotSnapshot) -> ReconcileReport {
    snapshot
        .robots
        .iter()
        .fold(ReconcileReport::default(), |mut report, robot| {
            report.record(scene.add_or_update_robot_body(&robot.id, robot.x, robot.y));
            report.record(scene.add_or_update_marker(&robot.id, robot.x, robot.y, robot.angle));
            report
        })
}

/// Poll task that keeps robot entities in the scene in step with the backend.
pub struct EntityReconciler<A> {
    api: Arc<A>,
    scene: SharedScene,
}

impl<A> Clone for EntityReconciler<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            scene: Arc::clone(&self.scene),
        }
    }
}

impl<A: FleetApi + 'static> EntityReconciler<A> {
    #[must_use]
    pub const fn new(api: Arc<A>, scene: SharedScene) -> Self {
        Self { api, scene }
    }

    /// One reconciliation cycle.
    ///
    /// A failed fetch skips the cycle and leaves the scene as it was. The
    /// snapshot is applied under a single write lock so concurrent cycles
    /// never interleave within one snapshot.
    pub async fn run_once(&self, guard: &TickGuard) -> Option<ReconcileReport> {
        let snapshot = self
            .api
            .fetch_robots()
            .await
            .warn_on_err("Robot poll failed; keeping last scene")?;

        let mut scene = self.scene.write().await;
        if !guard.is_current() {
            debug!("Discarding robot snapshot from a stopped poller");
            return None;
        }
        let report = reconcile(&mut scene, &snapshot);
        drop(scene);

        debug!(
            robots = snapshot.len(),
            created = report.created,
            updated = report.updated,
            refused = report.refused,
            "Robots reconciled"
        );
        Some(report)
    }
}

#[async_trait]
impl<A: FleetApi + 'static> PollTask for EntityReconciler<A> {
    async fn tick(&self, guard: TickGuard) {
        self.run_once(&guard).await;
    }
}
