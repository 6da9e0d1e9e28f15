use lxx_frame_common::*;

/// 主机上不真正休眠，只记录请求的时长
#[derive(Debug, Default)]
pub struct HostPower {
    pub light_sleep_ms: u64,
    pub deep_sleep_ms: Option<u32>,
}

impl PowerControl for HostPower {
    fn light_sleep(&mut self, duration_ms: u32) {
        info!("[Simulator Power] Light sleep {} ms (skipped)", duration_ms);
        self.light_sleep_ms += u64::from(duration_ms);
    }

    fn deep_sleep(&mut self, duration_ms: u32) {
        info!("[Simulator Power] Deep sleep {} ms, next wake-up ends the simulation", duration_ms);
        self.deep_sleep_ms = Some(duration_ms);
    }
}
