pub mod byte_source;
pub mod network;
pub mod power;

pub use byte_source::*;
pub use network::*;
pub use power::*;
