//! 3.0寸四色屏控制器命令

/// 控制器命令字节
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    PanelSetting = 0x00,
    PowerSetting = 0x01,
    PowerOff = 0x02,
    PowerOn = 0x04,
    BoosterSoftStart = 0x06,
    DeepSleep = 0x07,
    DataStartTransmission = 0x10,
    DisplayRefresh = 0x12,
    VcomDataInterval = 0x50,
    TconSetting = 0x60,
    ResolutionSetting = 0x61,
    /// 厂商寄存器解锁
    VendorUnlock = 0x66,
    ClockEnable = 0x84,
    BoostMode = 0xB0,
    PowerSaving = 0xE3,
}

impl Command {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// 刷新触发参数
pub const REFRESH_TRIGGER: u8 = 0x01;
/// 关闭电源参数
pub const POWER_OFF_PARAM: u8 = 0x00;
/// 深度睡眠校验字
pub const DEEP_SLEEP_CHECK: u8 = 0xA5;

/// 复位时序（毫秒）：拉高、拉低、再拉高后的保持时间
pub const RESET_HIGH_MS: u32 = 200;
pub const RESET_LOW_MS: u32 = 2;
/// 进入深度睡眠后的稳定时间
pub const SLEEP_SETTLE_MS: u32 = 2000;

/// 上电初始化序列，顺序与参数均为硬件要求，不可调整
pub const INIT_SEQUENCE: &[(Command, &[u8])] = &[
    (Command::VendorUnlock, &[0x49, 0x55, 0x13, 0x5D, 0x05, 0x10]),
    (Command::BoostMode, &[0x00]),
    (Command::PowerSetting, &[0x0F, 0x00]),
    (Command::PanelSetting, &[0x4F, 0x6B]),
    (Command::BoosterSoftStart, &[0xD7, 0xDE, 0x12]),
    // 168 x 400
    (Command::ResolutionSetting, &[0x00, 0xA8, 0x01, 0x90]),
    (Command::VcomDataInterval, &[0x37]),
    (Command::TconSetting, &[0x0C, 0x05]),
    (Command::PowerSaving, &[0xFF]),
    (Command::ClockEnable, &[0x00]),
];
