use rotorsim::config::{SimulationConfig, VehicleConfig};
use rotorsim::vehicles::{VehicleId, VehicleKind};
use rotorsim::world::World;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

/// One display-panel line, serialized to JSON on stdout
#[derive(Serialize)]
struct TelemetrySnapshot {
    vehicle: u32,
    kind: VehicleKind,
    x: f64,
    y: f64,
    altitude_m: f64,
    heading_deg: f64,
    fuel_kg: f64,
    items: i32,
}

fn emit_telemetry(world: &World, ids: &[VehicleId]) {
    for &id in ids {
        let pose = match world.get_pose(id) {
            Ok(pose) => pose,
            Err(err) => {
                warn!(%id, %err, "telemetry read failed");
                continue;
            }
        };
        let snapshot = TelemetrySnapshot {
            vehicle: id.0,
            kind: world.kind(id).unwrap_or(VehicleKind::Hover),
            x: pose.position.x,
            y: pose.position.y,
            altitude_m: pose.position.z,
            heading_deg: pose.heading_deg,
            fuel_kg: world.get_fuel_remaining(id).unwrap_or(0.0),
            items: world.get_item_count(id).unwrap_or(0),
        };
        match serde_json::to_string(&snapshot) {
            Ok(line) => println!("{line}"),
            Err(err) => warn!(%err, "telemetry serialization failed"),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rotorsim=info".into()),
        )
        .init();

    let config = match std::env::var("ROTORSIM_CONFIG") {
        Ok(path) => SimulationConfig::load(&path).unwrap_or_else(|err| {
            warn!(%path, %err, "failed to load config, using defaults");
            SimulationConfig::default()
        }),
        Err(_) => SimulationConfig::default(),
    };

    let run = config.run;
    let ratio = config.physics.time_ratio;
    let world = World::new(config.clone());
    world.start();

    let spawns = config
        .start
        .generate_spawns(run.hover_vehicles + run.delivery_vehicles);
    let mut ids = Vec::new();

    for spawn in spawns.iter().take(run.hover_vehicles) {
        let id = world.spawn_hover(VehicleConfig::unloaded(), *spawn);
        if let Err(err) = world.command_hover(id, run.hover_altitude_m) {
            warn!(%id, %err, "hover command failed");
        }
        ids.push(id);
    }
    for spawn in spawns.iter().skip(run.hover_vehicles) {
        let id = world.spawn_delivery(config.vehicle, *spawn);
        let waypoints = config.start.generate_waypoints(run.waypoints_per_vehicle);
        if let Err(err) = world.set_waypoints(id, waypoints) {
            warn!(%id, %err, "waypoint assignment failed");
        }
        ids.push(id);
    }

    info!(
        vehicles = ids.len(),
        duration_s = run.duration_s,
        ratio,
        "simulation running"
    );

    // Pace the run in wall-clock time; the loops pace themselves
    let wall_seconds = run.duration_s / ratio;
    let mut elapsed = 0.0;
    while elapsed < wall_seconds {
        std::thread::sleep(Duration::from_secs(1).min(Duration::from_secs_f64(
            (wall_seconds - elapsed).max(0.01),
        )));
        elapsed += 1.0;
        emit_telemetry(&world, &ids);
    }

    world.shutdown();
}
