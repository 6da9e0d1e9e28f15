pub mod config;
pub mod display;
pub mod error;

pub use config::*;
pub use display::*;
pub use error::*;
