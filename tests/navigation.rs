mod common;

use approx::assert_relative_eq;
use common::{assert_sample_valid, DeliveryHarness};
use nalgebra::Vector3;
use rotorsim::config::VehicleConfig;
use rotorsim::controllers::NavState;
use rotorsim::utils::math::planar_distance;

#[test]
fn test_nearest_waypoint_claimed_first() {
    let mut harness = DeliveryHarness::new(
        VehicleConfig::default(),
        vec![Vector3::new(10.0, 10.0, 0.0), Vector3::new(5.0, 5.0, 0.0)],
    );
    // Two navigation ticks: the first primes the estimator, the second
    // claims a destination and leaves the ground state
    harness.run_for(0.2);

    let dest = harness.navigation.destination().expect("no destination claimed");
    assert_relative_eq!(dest.x, 5.0);
    assert_relative_eq!(dest.y, 5.0);
    assert!(harness.navigation.state() != NavState::Landed);
}

#[test]
fn test_delivery_flight_reaches_waypoint() {
    let destination = Vector3::new(40.0, 0.0, 0.0);
    let mut harness = DeliveryHarness::new(VehicleConfig::default(), vec![destination]);
    let initial_items = harness.sample().item_count;

    harness.run_for(600.0);

    let sample = harness.sample();
    assert_sample_valid(&sample);
    let dist = planar_distance(&sample.position, &destination);
    assert!(
        dist <= 2.0,
        "vehicle ended {dist:.2} m from the destination in state {:?}",
        harness.navigation.state()
    );
    assert_eq!(
        sample.item_count,
        initial_items - 1,
        "cargo was not delivered"
    );
    // Delivery never removes the waypoint; that is the collaborator's job
    assert_eq!(harness.waypoints.lock().unwrap().len(), 1);
}

#[test]
fn test_idle_delivery_vehicle_patrols() {
    let mut harness = DeliveryHarness::new(VehicleConfig::default(), vec![]);
    harness.run_for(60.0);

    let sample = harness.sample();
    assert_sample_valid(&sample);
    assert!(sample.taken_off, "patrol must lift the craft");
    assert!(sample.position.z > 10.0, "altitude {} too low", sample.position.z);
    assert_eq!(harness.navigation.state(), NavState::Landed);
}

#[test]
fn test_waypoints_survive_flight_until_completed() {
    let destination = Vector3::new(30.0, 0.0, 0.0);
    let mut harness = DeliveryHarness::new(VehicleConfig::default(), vec![destination]);
    harness.run_for(5.0);

    // Mid-flight the queue still holds the claimed waypoint
    assert_eq!(harness.waypoints.lock().unwrap().len(), 1);

    // The external collaborator removes it
    assert!(harness.waypoints.lock().unwrap().complete(&destination));
    assert!(harness.waypoints.lock().unwrap().is_empty());
}
