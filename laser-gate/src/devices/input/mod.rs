pub mod light;
pub mod touch;
