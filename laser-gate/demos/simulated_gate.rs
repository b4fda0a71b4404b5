//! Runs the full gate on mocked hardware, with the control API served on http://127.0.0.1:8080.
//!
//! A background task crosses the beam every few seconds and touches the pad once to arm the gate.
//! Try: `curl http://127.0.0.1:8080/api/status` or `curl -X POST http://127.0.0.1:8080/api/toggle`
//!
//! Run with: `RUST_LOG=debug cargo run --example simulated_gate --features mocks`

use laser_gate::config::GateConfig;
use laser_gate::errors::Error;
use laser_gate::hardware::Board;
use laser_gate::io::HttpTransport;
use laser_gate::mocks::hardware::MockHardware;
use laser_gate::pause;
use laser_gate::runtime::PollLoop;
use tracing_subscriber::EnvFilter;

#[laser_gate::runtime]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = GateConfig::default().with_bind_address("127.0.0.1:8080");
    let hardware = MockHardware::default();
    let board = Board::new(hardware.clone()).open()?;

    // The operator: arm the gate once, then someone walks through the beam every 5s.
    tokio::spawn(async move {
        pause!(3000);
        hardware.push_digital(14, [true, false]);
        loop {
            pause!(5000);
            hardware.set_analog(34, 800);
            pause!(700);
            hardware.set_analog(34, 3000);
        }
    });

    let transport = HttpTransport::new(&config);
    let mut gate = PollLoop::new(&board, config, transport)?;
    gate.run().await?;

    board.close()?;
    Ok(())
}
