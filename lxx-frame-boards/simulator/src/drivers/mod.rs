mod epd;
mod network;
mod power;

pub use epd::init_epd;
pub use network::{FileFetcher, LoopbackLink};
pub use power::HostPower;
