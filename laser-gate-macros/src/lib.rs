//! Defines Laser-Gate runtime macros.

#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

extern crate proc_macro;

use proc_macro::TokenStream;

use crate::runtime_macro::{runtime_macro, TokioMode};

mod helpers;
mod runtime_macro;

/// Macro definition for the Laser-Gate runtime.
///
/// This macro should be used once only in a project, on the `main` function.
///
/// _Executes the entire function on a single-threaded (current thread) tokio runtime: the poll loop
/// is the only scheduler and nothing ever runs in parallel to it._
///
/// # Example
/// ```
/// #[laser_gate::runtime]
/// async fn main() {
///     // whatever
/// }
/// ```
#[proc_macro_attribute]
pub fn runtime(args: TokenStream, item: TokenStream) -> TokenStream {
    runtime_macro(args.into(), item.into(), TokioMode::Main).into()
}

/// Same as `#[laser_gate::runtime]` but for tests.
///
/// Tests are serialized (through `serial_test`, which must be a dev-dependency of the caller).
/// Use `#[laser_gate_macros::test(paused)]` to start the test with a paused tokio clock: every
/// `pause!()` then completes instantly while still advancing the virtual time.
#[proc_macro_attribute]
pub fn test(args: TokenStream, item: TokenStream) -> TokenStream {
    runtime_macro(args.into(), item.into(), TokioMode::Test).into()
}
