//! Demonstrates a calibration run on a noisy (mocked) light sensor.

use laser_gate::config::GateConfig;
use laser_gate::detection::{Calibrator, IntrusionDetector};
use laser_gate::hardware::Board;
use laser_gate::mocks::hardware::MockHardware;
use tracing_subscriber::EnvFilter;

#[laser_gate::runtime]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let hardware = MockHardware::default();
    hardware.push_analog(34, [3010, 2980, 3050, 2930, 3000, 3020, 2990, 2960, 3040, 3020]);
    // A couple of failing conversions: those samples are skipped.
    hardware.fail_analog(34, 2);

    let config = GateConfig::default().with_threshold_percent(75);
    let board = Board::new(hardware.clone());
    let mut detector =
        IntrusionDetector::new(&board, &config).expect("Buzzer pin should exist on the mock");

    let calibrator = Calibrator::new(&config);
    match detector.calibrate(&calibrator).await {
        Ok(threshold) => println!("New threshold: {}", threshold),
        Err(error) => println!("Calibration failed: {}", error),
    }
    println!("{}", detector);
}
