use rotorsim::vehicles::StateSample;

/// Assert that a sampled state contains no non-finite values
#[track_caller]
pub fn assert_sample_valid(sample: &StateSample) {
    assert!(sample.position.x.is_finite(), "Position x is not finite");
    assert!(sample.position.y.is_finite(), "Position y is not finite");
    assert!(sample.position.z.is_finite(), "Position z is not finite");
    assert!(sample.heading_deg.is_finite(), "Heading is not finite");
    assert!(sample.tilt_deg.is_finite(), "Tilt is not finite");
    assert!(
        sample.main_rotor_rpm.is_finite(),
        "Main rotor speed is not finite"
    );
    assert!(
        sample.tail_rotor_rpm.is_finite(),
        "Tail rotor speed is not finite"
    );
    assert!(sample.fuel_kg.is_finite(), "Fuel is not finite");
    assert!(sample.fuel_kg >= 0.0, "Fuel went negative");
    assert!(
        (0.0..360.0).contains(&sample.heading_deg),
        "Heading left [0, 360): {}",
        sample.heading_deg
    );
}
