//! 模拟墨水屏：记录 SPI 上的命令和数据，刷新时保存显存内容

use std::cell::RefCell;
use std::convert::Infallible;
use std::path::Path;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType as PinErrorType, InputPin, OutputPin};
use embedded_hal::spi::{ErrorType as SpiErrorType, Operation, SpiDevice};
use embedded_hal_mock::eh1::delay::NoopDelay;
use image::{ImageResult, Rgb as Pixel, RgbImage};
use lxx_frame_common::*;
use lxx_frame_core::Epd3in0g;
use lxx_frame_core::driver::Command;

pub type SimulatedEpd = Epd3in0g<SimSpi, SimBusy, SimDc, SimRst, NoopDelay>;

#[derive(Default)]
struct ControllerState {
    dc_high: bool,
    command: Option<u8>,
    ram: Vec<u8>,
    shown: Option<Vec<u8>>,
    refreshes: u32,
    asleep: bool,
}

impl ControllerState {
    fn on_byte(&mut self, byte: u8) {
        if !self.dc_high {
            self.on_command(byte);
        } else if self.command == Some(Command::DataStartTransmission.addr()) {
            self.ram.push(byte);
        }
    }

    fn on_command(&mut self, byte: u8) {
        self.command = Some(byte);
        if byte == Command::DataStartTransmission.addr() {
            self.ram.clear();
        } else if byte == Command::DisplayRefresh.addr() {
            self.refreshes += 1;
            self.shown = Some(self.ram.clone());
            debug!("[Simulator EPD] Refresh #{} ({} bytes)", self.refreshes, self.ram.len());
        } else if byte == Command::DeepSleep.addr() {
            self.asleep = true;
            debug!("[Simulator EPD] Deep sleep");
        }
    }
}

pub struct SimSpi(Rc<RefCell<ControllerState>>);

impl SpiErrorType for SimSpi {
    type Error = Infallible;
}

impl SpiDevice for SimSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
        let mut state = self.0.borrow_mut();
        for op in operations {
            if let Operation::Write(bytes) = op {
                bytes.iter().for_each(|&byte| state.on_byte(byte));
            }
        }
        Ok(())
    }
}

pub struct SimDc(Rc<RefCell<ControllerState>>);

impl PinErrorType for SimDc {
    type Error = Infallible;
}

impl OutputPin for SimDc {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().dc_high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().dc_high = true;
        Ok(())
    }
}

pub struct SimRst(Rc<RefCell<ControllerState>>);

impl PinErrorType for SimRst {
    type Error = Infallible;
}

impl OutputPin for SimRst {
    fn set_low(&mut self) -> Result<(), Infallible> {
        // 复位唤醒深度睡眠
        self.0.borrow_mut().asleep = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// 模拟的控制器操作瞬间完成，忙信号始终为空闲电平
pub struct SimBusy;

impl PinErrorType for SimBusy {
    type Error = Infallible;
}

impl InputPin for SimBusy {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(true)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(false)
    }
}

/// 读取模拟面板状态
#[derive(Clone)]
pub struct PanelProbe(Rc<RefCell<ControllerState>>);

impl PanelProbe {
    pub fn refreshes(&self) -> u32 {
        self.0.borrow().refreshes
    }

    pub fn is_asleep(&self) -> bool {
        self.0.borrow().asleep
    }

    /// 最近一次刷新时的显存内容
    pub fn shown(&self) -> Option<Vec<u8>> {
        self.0.borrow().shown.clone()
    }

    /// 把最近一次刷新的显存按调色板展开为 RGB 图像
    pub fn to_image(&self, geometry: PanelGeometry, palette: &Palette) -> Option<RgbImage> {
        let ram = self.shown()?;
        let width = geometry.width as usize;

        Some(RgbImage::from_fn(geometry.width, geometry.height, |x, y| {
            let (x, y) = (x as usize, y as usize);
            // 显存不足一帧时按白色显示
            let byte = ram.get((x + y * width) / 4).copied().unwrap_or(0x55);
            let shift = (3 - (x % 4)) * 2;
            let Rgb { r, g, b } = palette.color(PaletteIndex::from_bits(byte >> shift));
            Pixel([r, g, b])
        }))
    }

    /// 保存画面截图，格式由扩展名决定；面板从未刷新时返回 `false`
    pub fn screenshot(&self, path: &Path, geometry: PanelGeometry, palette: &Palette) -> ImageResult<bool> {
        let Some(image) = self.to_image(geometry, palette) else {
            return Ok(false);
        };
        image.save(path)?;
        info!("[Simulator EPD] Screenshot saved to {}", path.display());
        Ok(true)
    }
}

pub fn init_epd(config: DriverConfig) -> (SimulatedEpd, PanelProbe) {
    let state = Rc::new(RefCell::new(ControllerState::default()));
    let epd = Epd3in0g::new(
        SimSpi(state.clone()),
        SimBusy,
        SimDc(state.clone()),
        SimRst(state.clone()),
        NoopDelay::new(),
        config,
    );
    (epd, PanelProbe(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lxx_frame_core::PanelDriver;

    #[test]
    fn clear_is_captured_as_white_frame() {
        let (mut epd, probe) = init_epd(DriverConfig::default());
        epd.init().unwrap();
        epd.clear(0x55).unwrap();

        assert_eq!(probe.refreshes(), 1);
        let shown = probe.shown().unwrap();
        assert_eq!(shown.len(), 16_800);
        assert!(shown.iter().all(|&b| b == 0x55));

        let image = probe.to_image(PanelGeometry::EPD_3IN0G, &Palette::EPD_3IN0G).unwrap();
        assert_eq!(image.dimensions(), (168, 400));
        assert!(image.pixels().all(|p| *p == Pixel([255, 255, 255])));
    }

    #[test]
    fn sleep_and_reset_are_tracked() {
        let (mut epd, probe) = init_epd(DriverConfig::default());
        epd.init().unwrap();
        assert!(probe.to_image(PanelGeometry::EPD_3IN0G, &Palette::EPD_3IN0G).is_none());

        epd.sleep().unwrap();
        assert!(probe.is_asleep());
        epd.reset().unwrap();
        assert!(!probe.is_asleep());
    }

    #[test]
    fn screenshot_round_trips_through_png() {
        let (mut epd, probe) = init_epd(DriverConfig::default());
        let path = std::env::temp_dir().join(format!("lxx-frame-sim-{}.png", std::process::id()));
        assert!(!probe.screenshot(&path, PanelGeometry::EPD_3IN0G, &Palette::EPD_3IN0G).unwrap());

        epd.init().unwrap();
        epd.clear(PaletteIndex::Red.fill_byte()).unwrap();
        assert!(probe.screenshot(&path, PanelGeometry::EPD_3IN0G, &Palette::EPD_3IN0G).unwrap());

        let saved = image::open(&path).unwrap().to_rgb8();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(saved.dimensions(), (168, 400));
        assert_eq!(*saved.get_pixel(0, 0), Pixel([255, 0, 0]));
        assert_eq!(*saved.get_pixel(167, 399), Pixel([255, 0, 0]));
    }
}
