use std::fmt::{Display, Formatter};
use std::future::Future;
use std::time::Duration;

use futures::future;
use futures::FutureExt;
use log::{debug, error, info, warn};
use tokio::time::{sleep, Instant};

use crate::config::GateConfig;
use crate::control::ControlService;
use crate::detection::{IntrusionDetector, TouchToggle};
use crate::devices::TouchSensor;
use crate::errors::Error;
use crate::hardware::Board;
use crate::io::Transport;
use crate::pause;

/// The steps of one loop iteration, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    ServicingTouch,
    ServicingSample,
    ServicingRequest,
}

impl Step {
    pub const ALL: [Step; 3] = [
        Step::ServicingTouch,
        Step::ServicingSample,
        Step::ServicingRequest,
    ];
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::ServicingTouch => write!(f, "touch"),
            Step::ServicingSample => write!(f, "sample"),
            Step::ServicingRequest => write!(f, "request"),
        }
    }
}

/// The single-task scheduler owning the whole gate.
///
/// Each iteration services the touch pad, then the light sensor (rate limited), then at most one
/// pending client, and finally idles for a short delay. Every step runs to completion: blocking
/// waits (beeps, debounce, calibration) stall the loop for their whole duration.
#[derive(Debug)]
pub struct PollLoop<T: Transport> {
    config: GateConfig,
    detector: IntrusionDetector,
    touch: TouchSensor,
    toggle: TouchToggle,
    service: ControlService,
    transport: T,
    /// When the light sensor was last sampled.
    last_sample: Option<Instant>,
}

impl<T: Transport> PollLoop<T> {
    /// Wires the devices of the board as configured.
    ///
    /// # Errors
    /// * `UnknownPin`: the buzzer pin does not exist for this board.
    pub fn new(board: &Board, config: GateConfig, transport: T) -> Result<Self, Error> {
        Ok(Self {
            detector: IntrusionDetector::new(board, &config)?,
            touch: TouchSensor::new(board, config.touch_pin),
            toggle: TouchToggle::new(),
            service: ControlService::new(&config),
            transport,
            last_sample: None,
            config,
        })
    }

    /// Runs the start-up calibration (if enabled), then opens the transport.
    ///
    /// A failed calibration is not fatal: the gate starts with its previous threshold.
    pub async fn start(&mut self) -> Result<(), Error> {
        if self.config.calibrate_on_start {
            match self.service.calibrate(&mut self.detector).await {
                Ok(threshold) => info!("Initial threshold: {}", threshold),
                Err(error) => warn!("Initial calibration failed: {}", error),
            }
        }
        self.transport.open().await?;
        info!("Gate ready: {}", self.detector);
        Ok(())
    }

    /// Runs a single iteration step.
    pub async fn step(&mut self, step: Step) -> Result<(), Error> {
        match step {
            Step::ServicingTouch => self.service_touch().await,
            Step::ServicingSample => self.service_sample(),
            Step::ServicingRequest => {
                self.service_request().await;
                Ok(())
            }
        }
    }

    /// Runs one full iteration, idle delay excluded.
    pub async fn tick(&mut self) -> Result<(), Error> {
        for step in Step::ALL {
            self.step(step).await?;
        }
        Ok(())
    }

    /// Starts the gate and runs it until `shutdown` completes.
    ///
    /// The shutdown is only observed between two steps and during the idle (or fault) delay. A
    /// failing step is logged and the loop pauses before starting a new iteration.
    pub async fn run_until<F: Future<Output = ()>>(&mut self, shutdown: F) -> Result<(), Error> {
        self.start().await?;

        let idle = Duration::from_millis(self.config.idle_delay);
        let fault_pause = Duration::from_millis(self.config.fault_pause);
        tokio::pin!(shutdown);

        'run: loop {
            for step in Step::ALL {
                if shutdown.as_mut().now_or_never().is_some() {
                    break 'run;
                }
                if let Err(error) = self.step(step).await {
                    error!("Servicing {} failed: {}", step, error);
                    tokio::select! {
                        _ = &mut shutdown => break 'run,
                        _ = sleep(fault_pause) => continue 'run,
                    }
                }
            }
            tokio::select! {
                _ = &mut shutdown => break 'run,
                _ = sleep(idle) => {}
            }
        }

        self.stop()
    }

    /// Starts the gate and runs it until the operator interrupts the process (Ctrl-C).
    pub async fn run(&mut self) -> Result<(), Error> {
        self.run_until(async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                error!("Cannot listen to interrupt signal: {}", error);
                future::pending::<()>().await;
            }
        })
        .await
    }

    /// Silences the alarm and closes the transport.
    ///
    /// The transport is closed even if the alarm cannot be silenced: the first failure is returned.
    pub fn stop(&mut self) -> Result<(), Error> {
        info!("Stopping gate: {}", self.detector);
        let alarm = self.detector.force_alarm_off();
        let closed = self.transport.close();
        alarm.and(closed)
    }

    /// A touch arms or disarms the gate, then holds off the loop for the debounce window.
    async fn service_touch(&mut self) -> Result<(), Error> {
        let raw = self.touch.is_touched()?;
        if self.toggle.poll(raw).is_some() {
            self.detector.toggle_armed().await?;
            pause!(self.config.touch_debounce);
        }
        Ok(())
    }

    /// Samples the light sensor if the sampling interval is over.
    fn service_sample(&mut self) -> Result<(), Error> {
        let interval = Duration::from_millis(self.config.sample_interval);
        let now = Instant::now();
        if let Some(last) = self.last_sample {
            if now.duration_since(last) < interval {
                return Ok(());
            }
        }
        self.last_sample = Some(now);
        self.detector.check()?;
        Ok(())
    }

    /// Serves one pending client, if any. Faults are logged and discarded.
    async fn service_request(&mut self) {
        let (peer, request) = match self.transport.accept().await {
            Ok(Some(exchange)) => exchange,
            Ok(None) => return,
            Err(error) => {
                warn!("Request discarded: {}", error);
                return;
            }
        };

        let address = self.transport.network_address();
        let response = self
            .service
            .handle(&mut self.detector, &request, &address)
            .await;
        debug!("{} -> {:?}", request, response);
        if let Err(error) = self.transport.respond(peer, &response).await {
            warn!("Response to {} discarded: {}", request, error);
        }
    }

    // ########################################
    // Setters and Getters.

    pub fn get_detector(&self) -> &IntrusionDetector {
        &self.detector
    }

    pub fn get_toggle(&self) -> &TouchToggle {
        &self.toggle
    }

    pub fn get_transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Display for PollLoop<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PollLoop [{}, {}, {}]",
            self.detector, self.toggle, self.transport
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ApiRequest, ApiResponse};
    use crate::mocks::hardware::MockHardware;
    use crate::mocks::transport::MockTransport;

    fn create_loop(config: GateConfig) -> (MockHardware, MockTransport, PollLoop<MockTransport>) {
        let hardware = MockHardware::default();
        let transport = MockTransport::default();
        let poll_loop =
            PollLoop::new(&Board::new(hardware.clone()), config, transport.clone()).unwrap();
        hardware.clear_writes();
        (hardware, transport, poll_loop)
    }

    #[laser_gate_macros::test(paused)]
    async fn test_start() {
        let (hardware, transport, mut poll_loop) = create_loop(GateConfig::default());
        hardware.set_analog(34, 2500);
        poll_loop.start().await.unwrap();
        assert_eq!(poll_loop.get_detector().get_state().get_threshold(), 2000);
        assert!(transport.is_open());
        // Two acknowledgment beeps.
        assert_eq!(hardware.get_writes().len(), 4);
    }

    #[laser_gate_macros::test(paused)]
    async fn test_start_with_failing_calibration() {
        let (hardware, transport, mut poll_loop) = create_loop(GateConfig::default());
        hardware.fail_analog(34, 10);
        poll_loop.start().await.unwrap();
        assert_eq!(poll_loop.get_detector().get_state().get_threshold(), 0);
        assert!(transport.is_open());
    }

    #[laser_gate_macros::test(paused)]
    async fn test_start_without_calibration() {
        let config = GateConfig::default().with_calibrate_on_start(false);
        let (hardware, _, mut poll_loop) = create_loop(config);
        poll_loop.start().await.unwrap();
        assert_eq!(hardware.pending_analog(34), 0);
        assert!(hardware.get_writes().is_empty());
        assert_eq!(poll_loop.get_detector().get_state().get_threshold(), 0);
    }

    #[laser_gate_macros::test(paused)]
    async fn test_sampling_is_rate_limited() {
        let config = GateConfig::default().with_calibrate_on_start(false);
        let (hardware, _, mut poll_loop) = create_loop(config);
        poll_loop.start().await.unwrap();
        hardware.push_analog(34, [3000; 20]);

        // 11 iterations 10ms apart: t=0 and t=100 only.
        for _ in 0..11 {
            poll_loop.tick().await.unwrap();
            pause!(10);
        }
        assert_eq!(hardware.pending_analog(34), 18);
    }

    #[laser_gate_macros::test(paused)]
    async fn test_touch_toggles_and_debounces() {
        let config = GateConfig::default().with_calibrate_on_start(false);
        let (hardware, _, mut poll_loop) = create_loop(config);
        poll_loop.start().await.unwrap();
        hardware.set_digital(14, true);

        let start = Instant::now();
        poll_loop.step(Step::ServicingTouch).await.unwrap();
        assert!(poll_loop.get_detector().get_state().is_armed());
        // Short beep + debounce.
        assert!(start.elapsed().as_millis() >= 600);

        // Still touched: level triggered.
        poll_loop.step(Step::ServicingTouch).await.unwrap();
        assert!(!poll_loop.get_detector().get_state().is_armed());
        assert!(poll_loop.get_toggle().get_last_touch());

        hardware.set_digital(14, false);
        let start = Instant::now();
        poll_loop.step(Step::ServicingTouch).await.unwrap();
        assert!(!poll_loop.get_detector().get_state().is_armed());
        assert!(start.elapsed().as_millis() < 10);
    }

    #[laser_gate_macros::test(paused)]
    async fn test_intrusion_through_loop() {
        let config = GateConfig::default();
        let (hardware, _, mut poll_loop) = create_loop(config);
        hardware.set_analog(34, 2500);
        poll_loop.start().await.unwrap();

        hardware.push_digital(14, [true, false]);
        poll_loop.tick().await.unwrap();
        assert!(poll_loop.get_detector().get_state().is_armed());

        hardware.set_analog(34, 1500);
        pause!(100);
        poll_loop.tick().await.unwrap();
        assert_eq!(poll_loop.get_detector().get_state().get_intrusion_count(), 1);
        assert!(hardware.is_sounding(26));
    }

    #[laser_gate_macros::test(paused)]
    async fn test_serves_one_request_per_iteration() {
        let config = GateConfig::default().with_calibrate_on_start(false);
        let (_, transport, mut poll_loop) = create_loop(config);
        poll_loop.start().await.unwrap();
        transport.push_request(ApiRequest::Toggle);
        transport.push_request(ApiRequest::GetStatus);

        poll_loop.tick().await.unwrap();
        assert_eq!(transport.pending(), 1);
        poll_loop.tick().await.unwrap();
        assert_eq!(transport.pending(), 0);

        let responses = transport.get_responses();
        assert_eq!(
            responses[0],
            (
                ApiRequest::Toggle,
                ApiResponse::Armed {
                    system_active: true
                }
            )
        );
        match &responses[1].1 {
            ApiResponse::Status(status) => {
                assert!(status.armed);
                assert_eq!(status.current_light, 3000);
                assert_eq!(status.network_address, "192.168.4.1");
            }
            response => panic!("Unexpected response {:?}", response),
        }
    }

    #[laser_gate_macros::test(paused)]
    async fn test_request_faults_are_discarded() {
        let config = GateConfig::default().with_calibrate_on_start(false);
        let (_, transport, mut poll_loop) = create_loop(config);
        poll_loop.start().await.unwrap();
        transport.push_fault();
        transport.push_request(ApiRequest::Reset);

        poll_loop.tick().await.unwrap();
        poll_loop.tick().await.unwrap();
        assert_eq!(
            transport.get_responses(),
            vec![(ApiRequest::Reset, ApiResponse::Count { intrusion_count: 0 })]
        );
    }

    #[laser_gate_macros::test(paused)]
    async fn test_step_failure() {
        let config = GateConfig::default().with_calibrate_on_start(false);
        let (hardware, _, mut poll_loop) = create_loop(config);
        hardware.fail_analog(34, 1);
        assert!(poll_loop.tick().await.is_err());
    }

    #[laser_gate_macros::test(paused)]
    async fn test_run_until_pauses_after_fault() {
        let config = GateConfig::default().with_calibrate_on_start(false);
        let (hardware, transport, mut poll_loop) = create_loop(config);
        hardware.fail_analog(34, 1);
        hardware.push_analog(34, [3000; 20]);

        // Stopped during the fault pause: only the failing sample was attempted.
        let start = Instant::now();
        poll_loop
            .run_until(sleep(Duration::from_millis(900)))
            .await
            .unwrap();
        assert!(start.elapsed().as_millis() >= 900);
        assert_eq!(hardware.pending_analog(34), 20);
        assert!(!transport.is_open());
        assert_eq!(transport.get_close_count(), 1);
    }

    #[laser_gate_macros::test(paused)]
    async fn test_run_until_resumes_after_fault_pause() {
        let config = GateConfig::default().with_calibrate_on_start(false);
        let (hardware, transport, mut poll_loop) = create_loop(config);
        hardware.fail_analog(34, 1);
        hardware.push_analog(34, [3000; 20]);

        // Resumed at t=1000, next sample due at t=1100.
        poll_loop
            .run_until(sleep(Duration::from_millis(1055)))
            .await
            .unwrap();
        assert_eq!(hardware.pending_analog(34), 19);
        assert_eq!(transport.get_close_count(), 1);
    }

    #[laser_gate_macros::test(paused)]
    async fn test_touch_with_failing_buzzer() {
        let config = GateConfig::default().with_calibrate_on_start(false);
        let (hardware, _, mut poll_loop) = create_loop(config);
        poll_loop.start().await.unwrap();
        hardware.set_digital(14, true);
        poll_loop.step(Step::ServicingTouch).await.unwrap();
        assert!(poll_loop.get_detector().get_state().is_armed());

        // Disarming needs the alarm silenced first.
        hardware.fail_pwm(26, usize::MAX);
        assert!(poll_loop.step(Step::ServicingTouch).await.is_err());
        assert!(poll_loop.get_detector().get_state().is_armed());
    }

    #[laser_gate_macros::test(paused)]
    async fn test_stop_closes_transport_when_alarm_fails() {
        let config = GateConfig::default().with_calibrate_on_start(false);
        let (hardware, transport, mut poll_loop) = create_loop(config);
        hardware.fail_pwm(26, usize::MAX);
        assert!(poll_loop.run_until(async {}).await.is_err());
        assert!(!transport.is_open());
        assert_eq!(transport.get_close_count(), 1);
    }

    #[laser_gate_macros::test(paused)]
    async fn test_run_until_silences_alarm() {
        let config = GateConfig::default().with_calibrate_on_start(false);
        let (hardware, transport, mut poll_loop) = create_loop(config);
        transport.push_request(ApiRequest::Calibrate);
        transport.push_request(ApiRequest::Toggle);
        hardware.set_analog(34, 2500);

        poll_loop
            .run_until(async {
                sleep(Duration::from_millis(3000)).await;
            })
            .await
            .unwrap();
        let writes = hardware.get_writes();
        assert_eq!(writes.last().map(|write| write.duty), Some(0));
        assert!(!hardware.is_sounding(26));
        assert_eq!(poll_loop.get_detector().get_state().get_threshold(), 2000);
        assert!(poll_loop.get_detector().get_state().is_armed());
    }

    #[laser_gate_macros::test(paused)]
    async fn test_run_until_immediate_shutdown() {
        let config = GateConfig::default().with_calibrate_on_start(false);
        let (hardware, transport, mut poll_loop) = create_loop(config);
        hardware.set_digital(14, true);
        poll_loop.run_until(async {}).await.unwrap();
        // No step ran.
        assert!(!poll_loop.get_detector().get_state().is_armed());
        assert_eq!(transport.get_close_count(), 1);
        assert_eq!(hardware.get_writes().len(), 1);
    }

    #[test]
    fn test_display() {
        let (_, _, poll_loop) = create_loop(GateConfig::default());
        assert_eq!(
            format!("{}", poll_loop),
            "PollLoop [IntrusionDetector [armed=false, threshold=0, intrusions=0, alarm=false], TouchToggle [touched=false], MockTransport(192.168.4.1) [opened=false, pending=0]]"
        );
        assert_eq!(format!("{}", Step::ServicingSample), "sample");
    }
}
