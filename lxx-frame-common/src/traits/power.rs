/// 休眠控制，唤醒调度由平台实现
pub trait PowerControl {
    /// 浅睡眠，保留内存与外设状态
    fn light_sleep(&mut self, duration_ms: u32);

    /// 深度睡眠，到时后整机重启
    fn deep_sleep(&mut self, duration_ms: u32);
}

/// 允许空实现的 PowerControl（用于不需要休眠的平台）
impl PowerControl for () {
    fn light_sleep(&mut self, _duration_ms: u32) {}

    fn deep_sleep(&mut self, _duration_ms: u32) {}
}
