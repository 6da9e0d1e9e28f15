use core::fmt;

use serde::Deserialize;

/// 屏幕分辨率（3.0寸四色屏）
pub const EPD_WIDTH: u32 = 168;
pub const EPD_HEIGHT: u32 = 400;

/// 面板几何尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelGeometry {
    pub width: u32,
    pub height: u32,
}

impl PanelGeometry {
    pub const EPD_3IN0G: Self = Self {
        width: EPD_WIDTH,
        height: EPD_HEIGHT,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// 2bit/像素打包后的帧缓冲区大小
    pub const fn framebuffer_len(&self) -> usize {
        (self.width as usize * self.height as usize).div_ceil(4)
    }
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self::EPD_3IN0G
    }
}

/// 颜色定义（与硬件保持一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PaletteIndex {
    Black = 0b00,
    White = 0b01,
    Yellow = 0b10,
    Red = 0b11,
}

impl PaletteIndex {
    pub const ALL: [PaletteIndex; 4] = [Self::Black, Self::White, Self::Yellow, Self::Red];

    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// 只取低2位
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Black,
            0b01 => Self::White,
            0b10 => Self::Yellow,
            _ => Self::Red,
        }
    }

    /// 四个像素同色时的整字节取值，例如白色为 `0x55`
    pub const fn fill_byte(self) -> u8 {
        self.bits() * 0x55
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// 四色调色板，索引顺序固定为 黑、白、黄、红
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Palette {
    entries: [Rgb; 4],
}

impl Palette {
    pub const EPD_3IN0G: Self = Self {
        entries: [
            Rgb::new(0, 0, 0),
            Rgb::new(255, 255, 255),
            Rgb::new(255, 255, 0),
            Rgb::new(255, 0, 0),
        ],
    };

    pub const fn new(entries: [Rgb; 4]) -> Self {
        Self { entries }
    }

    pub const fn entries(&self) -> &[Rgb; 4] {
        &self.entries
    }

    pub const fn color(&self, index: PaletteIndex) -> Rgb {
        self.entries[index as usize]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::EPD_3IN0G
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    Uninitialized,
    AwaitingReset,
    Ready,
    Transmitting,
    Refreshing,
    Sleeping,
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::AwaitingReset => "awaiting-reset",
            Self::Ready => "ready",
            Self::Transmitting => "transmitting",
            Self::Refreshing => "refreshing",
            Self::Sleeping => "sleeping",
        };
        f.write_str(name)
    }
}
