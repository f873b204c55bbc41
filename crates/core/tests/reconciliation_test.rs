//! Behavioural tests for robot reconciliation under polling.
//!
//! These tests verify that:
//! - Snapshots are applied idempotently and additively
//! - Failed polls keep the last known scene
//! - Overlapping ticks never corrupt the scene
//! - A stopped poller never writes into the scene

#![forbid(clippy::unwrap_used)]
#![forbid(clippy::expect_used)]
#![forbid(clippy::panic)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use common::{FakeFleetApi, layout, line_graph, live_guard, robots};
use fleetview_core::models::GraphSnapshot;
use fleetview_core::{EntityReconciler, SceneModel, reconcile};

fn shared_scene() -> Arc<RwLock<SceneModel>> {
    Arc::new(RwLock::new(SceneModel::default()))
}

/// # GIVEN
/// A scene holding a drawn graph
///
/// # WHEN
/// The reconciler polls a snapshot with two robots
///
/// # THEN
/// Each robot has exactly one body and one marker and the graph is untouched
#[tokio::test]
async fn test_poll_creates_body_and_marker_per_robot() -> Result<(), Box<dyn std::error::Error>> {
    // GIVEN
    let api = FakeFleetApi::with_graph(GraphSnapshot::default());
    api.set_robots(robots(&[("1", 0.0, 0.0, 0.0), ("2", 50.0, 0.0, 90.0)]))
        .await;
    let scene = shared_scene();
    scene.write().await.load_graph(&line_graph())?;
    let reconciler = EntityReconciler::new(Arc::clone(&api), Arc::clone(&scene));
    let (_scheduler, guard) = live_guard()?;

    // WHEN
    let report = reconciler.run_once(&guard).await;

    // THEN
    assert_eq!(report.map(|r| r.created), Some(4));
    let scene = scene.read().await;
    assert_eq!(scene.robot_ids(), vec!["1", "2"]);
    assert_eq!(scene.robot_entity_count(), 4);
    assert_eq!(scene.node_count(), 3);
    assert_eq!(scene.edge_count(), 2);
    Ok(())
}

/// # GIVEN
/// A robot at the origin
///
/// # WHEN
/// Its heading is 0° and then 90°
///
/// # THEN
/// The marker sits at (15, 0) and then (0, 15)
#[tokio::test]
async fn test_marker_tracks_heading_across_polls() -> Result<(), Box<dyn std::error::Error>> {
    let api = FakeFleetApi::with_graph(GraphSnapshot::default());
    let scene = shared_scene();
    let reconciler = EntityReconciler::new(Arc::clone(&api), Arc::clone(&scene));
    let (_scheduler, guard) = live_guard()?;

    api.set_robots(robots(&[("7", 0.0, 0.0, 0.0)])).await;
    reconciler.run_once(&guard).await;
    let east = scene.read().await.lookup("robot-marker-7").and_then(|e| e.position());
    assert!(east.is_some_and(|p| (p.x - 15.0).abs() < 1e-9 && p.y.abs() < 1e-9));

    api.set_robots(robots(&[("7", 0.0, 0.0, 90.0)])).await;
    reconciler.run_once(&guard).await;
    let south = scene.read().await.lookup("robot-marker-7").and_then(|e| e.position());
    assert!(south.is_some_and(|p| p.x.abs() < 1e-9 && (p.y - 15.0).abs() < 1e-9));
    assert_eq!(scene.read().await.robot_entity_count(), 2);
    Ok(())
}

/// # GIVEN
/// A scene where one snapshot has been applied
///
/// # WHEN
/// The same snapshot is applied again
///
/// # THEN
/// The entity set and positions are unchanged
#[test]
fn test_repeated_snapshot_is_idempotent() {
    let snapshot = robots(&[("1", 3.0, 4.0, 30.0), ("2", 8.0, 1.0, 300.0)]);
    let mut scene = SceneModel::default();
    reconcile(&mut scene, &snapshot);
    let once = layout(&scene);

    let report = reconcile(&mut scene, &snapshot);

    assert_eq!(report.created, 0);
    assert_eq!(layout(&scene), once);
}

/// # GIVEN
/// Two robots in the scene
///
/// # WHEN
/// A snapshot arrives that only mentions one of them
///
/// # THEN
/// The missing robot's body and marker are left in place
#[test]
fn test_absent_robot_is_not_deleted() {
    let mut scene = SceneModel::default();
    reconcile(&mut scene, &robots(&[("1", 0.0, 0.0, 0.0), ("2", 20.0, 20.0, 0.0)]));
    let before: Vec<_> = layout(&scene)
        .into_iter()
        .filter(|(key, _)| key.ends_with('2'))
        .collect();

    reconcile(&mut scene, &robots(&[("1", 5.0, 5.0, 0.0)]));

    let after: Vec<_> = layout(&scene)
        .into_iter()
        .filter(|(key, _)| key.ends_with('2'))
        .collect();
    assert_eq!(before.len(), 2);
    assert_eq!(after, before);
}

/// # GIVEN
/// A scene with robots
///
/// # WHEN
/// The robot poll fails
///
/// # THEN
/// The tick is skipped and the scene keeps its last known state
#[tokio::test]
async fn test_failed_poll_keeps_last_scene() -> Result<(), Box<dyn std::error::Error>> {
    let api = FakeFleetApi::with_graph(GraphSnapshot::default());
    api.set_robots(robots(&[("1", 1.0, 1.0, 0.0)])).await;
    let scene = shared_scene();
    let reconciler = EntityReconciler::new(Arc::clone(&api), Arc::clone(&scene));
    let (_scheduler, guard) = live_guard()?;
    reconciler.run_once(&guard).await;
    let before = layout(&*scene.read().await);

    api.fail("fetch_robots").await;
    let report = reconciler.run_once(&guard).await;

    assert_eq!(report, None);
    assert_eq!(layout(&*scene.read().await), before);
    Ok(())
}

/// # GIVEN
/// Two reconciliation ticks whose fetches are both in flight
///
/// # WHEN
/// The fetches resolve in either order
///
/// # THEN
/// The scene equals applying the two snapshots in some serial order
#[tokio::test]
async fn test_overlapping_ticks_serialize() -> Result<(), Box<dyn std::error::Error>> {
    let first = robots(&[("1", 0.0, 0.0, 0.0), ("2", 10.0, 10.0, 45.0)]);
    let second = robots(&[("1", 5.0, 5.0, 90.0), ("3", 30.0, 30.0, 180.0)]);

    let serial = |order: [&fleetview_core::models::RobotSnapshot; 2]| {
        let mut scene = SceneModel::default();
        for snapshot in order {
            reconcile(&mut scene, snapshot);
        }
        layout(&scene)
    };
    let valid = [serial([&first, &second]), serial([&second, &first])];

    for second_resolves_first in [true, false] {
        let api = FakeFleetApi::with_graph(GraphSnapshot::default());
        let scene = shared_scene();
        let reconciler = EntityReconciler::new(Arc::clone(&api), Arc::clone(&scene));
        let (_scheduler, guard) = live_guard()?;
        let gate_a = api.gate_next_robot_fetch().await;
        let gate_b = api.gate_next_robot_fetch().await;

        let release = async {
            tokio::task::yield_now().await;
            if second_resolves_first {
                gate_b.send(second.clone()).ok();
                tokio::task::yield_now().await;
                gate_a.send(first.clone()).ok();
            } else {
                gate_a.send(first.clone()).ok();
                tokio::task::yield_now().await;
                gate_b.send(second.clone()).ok();
            }
        };
        let (a, b, ()) = tokio::join!(
            reconciler.run_once(&guard),
            reconciler.run_once(&guard),
            release
        );

        assert!(a.is_some() && b.is_some());
        let actual = layout(&*scene.read().await);
        assert!(
            valid.contains(&actual),
            "scene {actual:?} is not a serialization of the two snapshots"
        );
    }
    Ok(())
}

/// # GIVEN
/// A reconciliation tick waiting on its fetch
///
/// # WHEN
/// The poller is stopped before the fetch resolves
///
/// # THEN
/// The late snapshot is discarded and no entity is created
#[tokio::test]
async fn test_stopped_poller_does_not_resurrect_entities() -> Result<(), Box<dyn std::error::Error>>
{
    let api = FakeFleetApi::with_graph(GraphSnapshot::default());
    let scene = shared_scene();
    let reconciler = EntityReconciler::new(Arc::clone(&api), Arc::clone(&scene));
    let (mut scheduler, guard) = live_guard()?;
    let gate = api.gate_next_robot_fetch().await;

    let in_flight = tokio::spawn({
        let reconciler = reconciler.clone();
        async move { reconciler.run_once(&guard).await }
    });
    tokio::task::yield_now().await;

    scheduler.stop();
    scene.write().await.clear_all();
    gate.send(robots(&[("1", 0.0, 0.0, 0.0)]))
        .map_err(|_| "fetch no longer waiting")?;

    assert_eq!(in_flight.await?, None);
    assert!(scene.read().await.is_empty());
    Ok(())
}

/// # GIVEN
/// A reconciler driven by a real scheduler
///
/// # WHEN
/// Time advances across several periods
///
/// # THEN
/// Robot positions follow the backend
#[tokio::test(start_paused = true)]
async fn test_scheduler_drives_reconciler() -> Result<(), Box<dyn std::error::Error>> {
    let api = FakeFleetApi::with_graph(GraphSnapshot::default());
    let scene = shared_scene();
    let mut scheduler = fleetview_core::PollingScheduler::new("robots");
    scheduler.start(
        Duration::from_millis(50),
        Arc::new(EntityReconciler::new(Arc::clone(&api), Arc::clone(&scene))),
    )?;

    api.set_robots(robots(&[("1", 1.0, 1.0, 0.0)])).await;
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(scene.read().await.robot_ids(), vec!["1"]);

    api.set_robots(robots(&[("1", 9.0, 9.0, 0.0)])).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    let body = scene.read().await.lookup("robot-1").and_then(|e| e.position());
    assert_eq!(body.map(|p| (p.x, p.y)), Some((9.0, 9.0)));

    scheduler.stop();
    Ok(())
}
