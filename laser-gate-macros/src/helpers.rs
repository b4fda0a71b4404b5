use proc_macro2::TokenStream;
use quote::quote;

/// Determines what crate name should be used to refer to `laser_gate`.
/// crate::... or laser_gate::... depending.
pub fn laser_gate_crate_path() -> TokenStream {
    match is_internal() {
        true => quote!(crate),
        false => quote!(laser_gate),
    }
}

/// Same as [`laser_gate_crate_path`] but as the string literal expected by tokio's `crate = "..."`
/// macro option.
pub fn tokio_crate_literal() -> String {
    match is_internal() {
        true => String::from("crate::utils::tokio"),
        false => String::from("laser_gate::utils::tokio"),
    }
}

fn is_internal() -> bool {
    let is_internal = std::env::var("CARGO_CRATE_NAME")
        .map(|pkg_name| pkg_name == "laser_gate")
        .unwrap_or_default();

    #[cfg(doctest)]
    let is_internal = false;

    is_internal
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    // Both cases live in one test: the environment is shared by all test threads.
    #[test]
    fn test_crate_path() {
        env::set_var("CARGO_CRATE_NAME", "laser_gate");
        assert_eq!(laser_gate_crate_path().to_string(), "crate");
        assert_eq!(tokio_crate_literal(), "crate::utils::tokio");

        env::set_var("CARGO_CRATE_NAME", "some_other_crate");
        assert_eq!(laser_gate_crate_path().to_string(), "laser_gate");
        assert_eq!(tokio_crate_literal(), "laser_gate::utils::tokio");

        env::remove_var("CARGO_CRATE_NAME");
        assert_eq!(laser_gate_crate_path().to_string(), "laser_gate");
    }
}
