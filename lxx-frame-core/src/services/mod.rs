pub mod display_service;
pub mod refresh_cycle;

pub use display_service::*;
pub use refresh_cycle::*;
