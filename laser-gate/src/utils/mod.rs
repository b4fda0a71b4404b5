//! Re-exports used by the `#[laser_gate::runtime]` macros and timing helpers.

pub use tokio;

/// Waits for the given number of milliseconds.
///
/// Everything in the controller runs on a single task: a pause stalls the whole poll loop.
#[macro_export]
macro_rules! pause {
    ($ms:expr) => {
        $crate::utils::tokio::time::sleep($crate::utils::tokio::time::Duration::from_millis(
            $ms as u64,
        ))
        .await
    };
}
