pub const EARTH_ACCELERATION: f64 = 9.80665; // m/s^2
pub const THRUST_PER_RPM: f64 = 11.1111; // N per RPM of main rotor

// Main rotor
pub const MAX_MAIN_ROTOR_SPEED: f64 = 400.0; // RPM
pub const MAX_MAIN_ROTOR_DELTA: f64 = 60.0; // RPM per second

// Tail rotor
pub const MAX_TAIL_ROTOR_SPEED: f64 = 120.0; // RPM
pub const STABLE_TAIL_ROTOR_SPEED: f64 = 100.0; // RPM
pub const MIN_TAIL_ROTOR_SPEED: f64 = 80.0; // RPM
pub const MAX_TAIL_ROTOR_DELTA: f64 = 15.0; // RPM per second
pub const ROTATION_PER_TAIL_RPM: f64 = 3.0; // degrees per second per RPM off stable

// Tilt
pub const MAX_TILT_MAGNITUDE: f64 = 5.0; // degrees
pub const MAX_TILT_DELTA: f64 = 3.0; // degrees per second

// Fuel: one rotor revolution burns 1/60 kg
pub const FUEL_PER_REVOLUTION: f64 = 1.0 / 60.0; // kg

// Rotor animation: 1 RPM sweeps 6 degrees per second
pub const ROTOR_DEGREES_PER_RPM_SECOND: f64 = 6.0;

// Masses
pub const BASE_MASS: f64 = 100.0; // kg
pub const ITEM_WEIGHT: f64 = 10.0; // kg
pub const TOTAL_CAPACITY: f64 = 300.0; // kg, split between cargo and fuel

// Fixed physics timestep
pub const DEFAULT_TIMESTEP: f64 = 1.0 / 30.0; // s

// Controller periods, scaled by the global time ratio at runtime
pub const ALTITUDE_PERIOD_MS: u64 = 200;
pub const HEADING_PERIOD_MS: u64 = 90;
pub const SPEED_PERIOD_MS: u64 = 200;
pub const NAVIGATION_PERIOD_MS: u64 = 20;
