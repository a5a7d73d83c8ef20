//! Scenario setup validation tests
//!
//! Covers spawn point classification, generator wiring and the setup entry
//! point on grid networks.

use directional_traffic::simulation::{
    wire, DestinationError, GridLayout, Heading, LaneId, Position, RoadNetwork, ScenarioConfig,
    ScenarioError, ScenarioMode, ScenarioSetup, SimId, SpawnClass, SpawnPoint,
    SpawnPointClassifier, SpawnPointId,
};

fn spawn_points_at(ys: &[f32]) -> Vec<SpawnPoint> {
    ys.iter()
        .enumerate()
        .map(|(i, &y)| SpawnPoint {
            id: SpawnPointId(SimId(i)),
            lane: LaneId(SimId(100 + i)),
            position: Position::new(i as f32 * 10.0, y),
            generator: None,
        })
        .collect()
}

/// (spawn point, rate) for every spawn point in network order
fn rates(network: &RoadNetwork) -> Vec<(SpawnPointId, f32)> {
    network
        .spawn_points()
        .iter()
        .map(|sp| {
            let generator = sp.generator.as_ref().expect("every spawn point is wired");
            (sp.id, generator.rate())
        })
        .collect()
}

fn entry_heading(network: &RoadNetwork, spawn_point: &SpawnPoint) -> Heading {
    let road_id = network.road_of_lane(spawn_point.lane).unwrap();
    network.get_road(road_id).unwrap().heading
}

/// Test that only spawn points within the margin of the maximum Y are directional
#[test]
fn test_classification_picks_bottom_row() {
    let classifier = SpawnPointClassifier::new(0.1).unwrap();
    let points = spawn_points_at(&[0.0, 10.0, 20.0, 100.0]);

    let classification = classifier.classify(&points);
    assert_eq!(classification.threshold, Some(90.0));
    assert_eq!(classification.directional_count(), 1);
    assert!(classification.is_directional(points[3].id));
    for sp in &points[..3] {
        assert_eq!(classification.class_of(sp.id), Some(SpawnClass::Other));
    }
}

/// Test that spawn points sharing one Y value are all directional
#[test]
fn test_classification_with_equal_y_is_all_directional() {
    let classifier = SpawnPointClassifier::default();
    let points = spawn_points_at(&[50.0, 50.0, 50.0]);

    let classification = classifier.classify(&points);
    assert_eq!(classification.threshold, Some(50.0));
    assert_eq!(classification.directional_count(), 3);
    assert_eq!(classification.other_count(), 0);
}

/// Test that a single spawn point is directional and an empty set has no threshold
#[test]
fn test_classification_single_and_empty() {
    let classifier = SpawnPointClassifier::default();

    let single = spawn_points_at(&[12.5]);
    assert!(classifier.classify(&single).is_directional(single[0].id));

    let empty = classifier.classify(&[]);
    assert_eq!(empty.threshold, None);
    assert!(empty.classes.is_empty());
}

/// Test that a larger margin fraction classifies more rows as directional
#[test]
fn test_wider_margin_includes_more_rows() {
    let points = spawn_points_at(&[0.0, 10.0, 20.0, 100.0]);

    let wide = SpawnPointClassifier::new(0.85).unwrap().classify(&points);
    assert_eq!(wide.directional_count(), 2);

    let everything = SpawnPointClassifier::new(1.0).unwrap().classify(&points);
    assert_eq!(everything.directional_count(), 4);
}

/// Test that margin fractions outside 0..=1 or NaN are rejected
#[test]
fn test_margin_fraction_validated() {
    assert!(SpawnPointClassifier::new(-0.1).is_none());
    assert!(SpawnPointClassifier::new(1.5).is_none());
    assert!(SpawnPointClassifier::new(f32::NAN).is_none());
    assert_eq!(
        SpawnPointClassifier::new(0.25).map(|c| c.margin_fraction()),
        Some(0.25)
    );
}

/// Test that on a grid exactly the northbound entrances on the south edge are directional
#[test]
fn test_grid_classification_finds_south_entrances() {
    let network = GridLayout {
        columns: 3,
        rows: 2,
        ..GridLayout::default()
    }
    .build()
    .unwrap();
    let classification = SpawnPointClassifier::default().classify(network.spawn_points());

    assert_eq!(classification.directional_count(), 9);
    for sp in network.spawn_points() {
        assert_eq!(
            classification.is_directional(sp.id),
            entry_heading(&network, sp) == Heading::North,
            "spawn point {:?} misclassified",
            sp.id
        );
    }
}

/// Test that setup gives directional spawn points the traffic level and others zero
#[test]
fn test_rate_assignment_on_single_intersection() {
    let mut network = GridLayout::default().build().unwrap();
    assert_eq!(network.spawn_point_count(), 12);

    let report = ScenarioSetup::new(ScenarioConfig {
        traffic_level: 0.28,
        ..ScenarioConfig::default()
    })
    .apply(&mut network)
    .unwrap();

    assert_eq!(report.activated, 3);
    assert_eq!(report.deactivated, 9);
    assert!(report.orphan_lanes.is_empty());
    assert!(report.unreachable.is_empty());

    for sp in network.spawn_points() {
        let rate = sp.generator.as_ref().unwrap().rate();
        if entry_heading(&network, sp) == Heading::North {
            assert_eq!(rate, 0.28);
        } else {
            assert_eq!(rate, 0.0);
        }
    }
}

/// Test that wiring twice with the same inputs gives the same rates
#[test]
fn test_wiring_is_idempotent() {
    let mut network = GridLayout {
        columns: 2,
        rows: 2,
        ..GridLayout::default()
    }
    .build()
    .unwrap();
    let classification = SpawnPointClassifier::default().classify(network.spawn_points());

    let first_counts = wire(&mut network, &classification, 0.5).unwrap();
    let first = rates(&network);
    let second_counts = wire(&mut network, &classification, 0.5).unwrap();
    let second = rates(&network);

    assert_eq!(first_counts, second_counts);
    assert_eq!(first, second);
    assert_eq!(network.spawn_point_count(), first.len());
}

/// Test that a second wiring pass replaces earlier generators
#[test]
fn test_rewiring_replaces_generators() {
    let mut network = GridLayout::default().build().unwrap();
    let classification = SpawnPointClassifier::default().classify(network.spawn_points());

    wire(&mut network, &classification, 0.9).unwrap();
    wire(&mut network, &classification, 0.1).unwrap();

    let active: Vec<f32> = rates(&network)
        .into_iter()
        .map(|(_, rate)| rate)
        .filter(|&rate| rate > 0.0)
        .collect();
    assert_eq!(active, vec![0.1; 3]);
}

/// Test that setup fails before wiring when an active entry has no destination
#[test]
fn test_setup_fails_fast_when_entry_has_no_destination() {
    let mut network = RoadNetwork::new();
    let north = network.add_road("North", Heading::North, 25.0);
    let south = network.add_road("South", Heading::South, 25.0);
    network.set_dual(north, south).unwrap();
    let lane = network
        .add_lane(north, Position::new(5.0, 100.0), Position::new(5.0, 0.0), 4.0)
        .unwrap();
    network.add_spawn_point(lane, Position::new(5.0, 100.0)).unwrap();
    network.set_destination_roads(vec![south]).unwrap();

    let result = ScenarioSetup::default().apply(&mut network);
    assert_eq!(
        result,
        Err(ScenarioError::Destination(
            DestinationError::NoEligibleDestination { road: north }
        ))
    );
    assert!(network.spawn_points()[0].generator.is_none());
}

/// Test that setup rejects a network without destination roads
#[test]
fn test_setup_rejects_empty_destination_set() {
    let mut network = RoadNetwork::new();
    let road = network.add_road("Lonely", Heading::East, 25.0);
    let lane = network
        .add_lane(road, Position::new(0.0, 10.0), Position::new(100.0, 10.0), 4.0)
        .unwrap();
    network.add_spawn_point(lane, Position::new(0.0, 10.0)).unwrap();

    assert_eq!(
        ScenarioSetup::default().apply(&mut network),
        Err(ScenarioError::Destination(
            DestinationError::EmptyDestinationSet
        ))
    );
}

/// Test that invalid configuration values are rejected without touching the network
#[test]
fn test_setup_rejects_bad_configuration() {
    let mut network = GridLayout::default().build().unwrap();

    let bad_margin = ScenarioSetup::new(ScenarioConfig {
        margin_fraction: 2.0,
        ..ScenarioConfig::default()
    });
    assert_eq!(
        bad_margin.apply(&mut network),
        Err(ScenarioError::InvalidMarginFraction(2.0))
    );

    let bad_level = ScenarioSetup::new(ScenarioConfig {
        traffic_level: -1.0,
        ..ScenarioConfig::default()
    });
    assert_eq!(
        bad_level.apply(&mut network),
        Err(ScenarioError::InvalidTrafficLevel(-1.0))
    );

    let bad_interval = ScenarioSetup::new(ScenarioConfig {
        mode: ScenarioMode::Baseline { interval: 0.0 },
        ..ScenarioConfig::default()
    });
    assert_eq!(
        bad_interval.apply(&mut network),
        Err(ScenarioError::InvalidBaselineInterval(0.0))
    );

    assert!(network.spawn_points().iter().all(|sp| sp.generator.is_none()));
}

/// Test that baseline mode gives every spawn point a periodic generator
#[test]
fn test_baseline_activates_every_spawn_point() {
    let mut network = GridLayout::default().build().unwrap();
    let report = ScenarioSetup::new(ScenarioConfig {
        mode: ScenarioMode::Baseline { interval: 2.0 },
        ..ScenarioConfig::default()
    })
    .apply(&mut network)
    .unwrap();

    assert_eq!(report.activated, 12);
    assert_eq!(report.deactivated, 0);
    assert_eq!(report.threshold, None);
    assert!(rates(&network).iter().all(|&(_, rate)| rate == 0.5));
}

/// Test that destinations with no route from an active entry are reported
#[test]
fn test_unreachable_destinations_reported() {
    // Two independent dual pairs with no turning connections between them
    let mut network = RoadNetwork::new();
    let north = network.add_road("North", Heading::North, 25.0);
    let south = network.add_road("South", Heading::South, 25.0);
    let east = network.add_road("East", Heading::East, 25.0);
    let west = network.add_road("West", Heading::West, 25.0);
    network.set_dual(north, south).unwrap();
    network.set_dual(east, west).unwrap();

    let lane = network
        .add_lane(north, Position::new(5.0, 100.0), Position::new(5.0, 0.0), 4.0)
        .unwrap();
    network.add_spawn_point(lane, Position::new(5.0, 100.0)).unwrap();
    network
        .set_destination_roads(vec![north, south, east, west])
        .unwrap();

    let report = ScenarioSetup::default().apply(&mut network).unwrap();
    assert_eq!(report.activated, 1);
    assert_eq!(report.unreachable, vec![(north, east), (north, west)]);

    network.connect_roads(north, east).unwrap();
    network.connect_roads(east, west).unwrap();
    assert!(network.unreachable_destinations(north).is_empty());
}

/// Test that wiring rejects a NaN or negative rate and leaves generators unset
#[test]
fn test_wire_rejects_invalid_rate() {
    let mut network = GridLayout::default().build().unwrap();
    let classification = SpawnPointClassifier::default().classify(network.spawn_points());

    assert!(matches!(
        wire(&mut network, &classification, f32::NAN),
        Err(ScenarioError::InvalidTrafficLevel(rate)) if rate.is_nan()
    ));
    assert_eq!(
        wire(&mut network, &classification, -0.5),
        Err(ScenarioError::InvalidTrafficLevel(-0.5))
    );
    assert_eq!(
        wire(&mut network, &classification, f32::INFINITY),
        Err(ScenarioError::InvalidTrafficLevel(f32::INFINITY))
    );
    assert!(network.spawn_points().iter().all(|sp| sp.generator.is_none()));

    assert!(wire(&mut network, &classification, 0.0).is_ok());
}

/// Test that every grid spawn point sits at the start of a lane on its road
#[test]
fn test_grid_spawn_points_sit_at_lane_starts() {
    let layout = GridLayout {
        columns: 2,
        rows: 3,
        ..GridLayout::default()
    };
    let network = layout.build().unwrap();

    for sp in network.spawn_points() {
        let lane = network.get_lane(sp.lane).expect("spawn lane is in the network");
        assert_eq!(sp.position, lane.start);
        assert_eq!(Some(lane.road), network.road_of_lane(sp.lane));
        assert_eq!(lane.width, layout.lane_width);
        assert!(network.get_road(lane.road).unwrap().lanes.contains(&lane.id));
    }
    assert!(network.get_lane(LaneId(SimId(10_000))).is_none());
}
