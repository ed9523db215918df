//! Integration tests for the layer reconciliation pass.

use fire_map_core::core_types::{haversine_km, Metrics};
use fire_map_core::{
    Entity, EntityKind, HeadlessBackend, LatLng, MapBackend, MapConfig, MapError, MapSession,
    Reconciler, ReconcileInput, Selection, FOCUS_ZOOM,
};

fn alert(id: &str, pos: Option<LatLng>) -> Entity {
    Entity {
        id: id.to_string(),
        kind: EntityKind::Alert,
        label: None,
        position: pos,
        alarm_active: true,
        metrics: Metrics::default(),
        observed_at: Some("2026-08-29T09:15:00Z".to_string()),
    }
}

fn session() -> MapSession<HeadlessBackend> {
    MapSession::create(HeadlessBackend::new(), &MapConfig::default()).unwrap()
}

#[test]
fn test_end_to_end_selected_alert_with_team() {
    let alert_pos = LatLng::new(19.0760, 72.8777);
    let team_pos = LatLng::new(19.0860, 72.8877);
    let alerts = [alert("a1", Some(alert_pos))];
    let selection = Selection::Alert("a1".to_string());

    let mut session = session();
    let mut reconciler = Reconciler::new();
    let summary = reconciler
        .reconcile(
            &mut session,
            &ReconcileInput {
                alerts: &alerts,
                devices: &[],
                selection: &selection,
                team_position: Some(team_pos),
            },
        )
        .unwrap();

    // 1 alert marker + 1 team marker, 1 connector, 1 distance label
    assert_eq!(summary.markers, 2);
    assert_eq!(summary.polylines, 1);
    assert_eq!(summary.labels, 1);
    assert_eq!(summary.focused, Some(alert_pos));
    assert_eq!(session.layer_count(), 4);

    let backend = session.backend().unwrap();
    assert_eq!(backend.layer_count(), 4);

    // Camera recentered on the selection at the focus zoom
    assert_eq!(backend.view(), Some((alert_pos, FOCUS_ZOOM)));
    // Popup open was sequenced after the camera move
    assert_eq!(backend.scheduled_popups().len(), 1);

    // Connector runs team -> selection, dashed
    let lines = backend.polylines();
    assert_eq!(lines[0].points, vec![team_pos, alert_pos]);
    assert_eq!(lines[0].dash_array.as_deref(), Some("5, 10"));

    // Label sits at the midpoint and shows the rounded haversine distance
    let labels = backend.labels();
    let expected = format!("Distance: {:.2} km", haversine_km(team_pos, alert_pos));
    assert!(labels[0].html.contains(&expected), "label: {}", labels[0].html);
    assert!((labels[0].position.lat - 19.0810).abs() < 1e-9);
}

#[test]
fn test_reconciliation_is_idempotent() {
    let alerts = [alert("a1", Some(LatLng::new(19.0760, 72.8777)))];
    let selection = Selection::None;
    let input = ReconcileInput {
        alerts: &alerts,
        devices: &[],
        selection: &selection,
        team_position: Some(LatLng::new(19.0860, 72.8877)),
    };

    let mut session = session();
    let mut reconciler = Reconciler::new();

    let first = reconciler.reconcile(&mut session, &input).unwrap();
    let second = reconciler.reconcile(&mut session, &input).unwrap();

    assert_eq!(first, second);
    assert_eq!(session.layer_count(), 2); // alert + team, no selection
    assert_eq!(session.backend().unwrap().layer_count(), 2);
}

#[test]
fn test_no_leak_across_many_passes() {
    let alerts: Vec<Entity> = (0..5)
        .map(|i| alert(&format!("a{i}"), Some(LatLng::new(19.0 + f64::from(i) * 0.01, 72.9))))
        .collect();
    let selection = Selection::Alert("a2".to_string());
    let input = ReconcileInput {
        alerts: &alerts,
        devices: &[],
        selection: &selection,
        team_position: Some(LatLng::new(19.2, 73.0)),
    };

    let mut session = session();
    let mut reconciler = Reconciler::new();
    let baseline = reconciler.reconcile(&mut session, &input).unwrap();
    let expected_layers = session.backend().unwrap().layer_count();

    for _ in 0..50 {
        let summary = reconciler.reconcile(&mut session, &input).unwrap();
        assert_eq!(summary, baseline);
        assert_eq!(session.backend().unwrap().layer_count(), expected_layers);
    }
}

#[test]
fn test_unresolvable_entity_contributes_nothing() {
    let alerts = [alert("bad", None), alert("good", Some(LatLng::new(19.0, 72.9)))];
    let selection = Selection::None;

    let mut session = session();
    let summary = Reconciler::new()
        .reconcile(
            &mut session,
            &ReconcileInput {
                alerts: &alerts,
                devices: &[],
                selection: &selection,
                team_position: None,
            },
        )
        .unwrap();

    assert_eq!(summary.markers, 1);
    assert_eq!(summary.skipped_unresolvable, 1);
    assert_eq!(summary.polylines, 0);
    assert_eq!(summary.labels, 0);
}

#[test]
fn test_no_selection_and_no_team_skips_focus_and_connector() {
    let alerts = [alert("a1", Some(LatLng::new(19.0, 72.9)))];
    let selection = Selection::None;

    let mut session = session();
    let initial_view = session.backend().unwrap().view();
    let summary = Reconciler::new()
        .reconcile(
            &mut session,
            &ReconcileInput {
                alerts: &alerts,
                devices: &[],
                selection: &selection,
                team_position: None,
            },
        )
        .unwrap();

    assert_eq!(summary.focused, None);
    assert_eq!(summary.polylines, 0);
    assert_eq!(summary.labels, 0);
    // Camera untouched
    assert_eq!(session.backend().unwrap().view(), initial_view);
    assert!(session.backend().unwrap().scheduled_popups().is_empty());
}

#[test]
fn test_teardown_discards_scheduled_popups_and_blocks_reconcile() {
    let alerts = [alert("a1", Some(LatLng::new(19.0760, 72.8777)))];
    let selection = Selection::Alert("a1".to_string());
    let input = ReconcileInput {
        alerts: &alerts,
        devices: &[],
        selection: &selection,
        team_position: None,
    };

    let mut session = session();
    let mut reconciler = Reconciler::new();
    reconciler.reconcile(&mut session, &input).unwrap();
    assert_eq!(session.backend().unwrap().scheduled_popups().len(), 1);

    session.teardown();
    assert_eq!(
        reconciler.reconcile(&mut session, &input).unwrap_err(),
        MapError::SessionClosed
    );

    let backend = session.into_backend();
    assert!(backend.is_disposed());
    assert!(backend.scheduled_popups().is_empty());
    assert_eq!(backend.layer_count(), 0);
}
