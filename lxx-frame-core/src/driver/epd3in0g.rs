//! 3.0寸四色墨水屏驱动（168x400，2bit/像素）

use core::iter;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::spi::{self, SpiDevice};
use lxx_frame_common::*;

use super::PanelDriver;
use super::command::*;
use crate::render::Framebuffer;

/// 等待忙信号达到的电平
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusyLevel {
    /// 等待 BUSY 变为高电平（该控制器空闲时为高）
    High,
    Low,
}

/// 墨水屏驱动
///
/// 命令与数据逐字节发送，每个字节是一次独立的 SPI 事务，片选由 `SpiDevice` 管理。
pub struct Epd3in0g<SPI, BUSY, DC, RST, DELAY> {
    spi: SPI,
    busy: BUSY,
    dc: DC,
    rst: RST,
    delay: DELAY,
    config: DriverConfig,
    state: DeviceState,
}

impl<SPI, BUSY, DC, RST, DELAY> Epd3in0g<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    pub fn new(spi: SPI, busy: BUSY, dc: DC, rst: RST, delay: DELAY, config: DriverConfig) -> Self {
        Self {
            spi,
            busy,
            dc,
            rst,
            delay,
            config,
            state: DeviceState::Uninitialized,
        }
    }

    /// 交还底层外设
    pub fn release(self) -> (SPI, BUSY, DC, RST, DELAY) {
        (self.spi, self.busy, self.dc, self.rst, self.delay)
    }

    /// 帧缓冲区应有的字节数
    pub const fn buffer_len() -> usize {
        PanelGeometry::EPD_3IN0G.framebuffer_len()
    }

    fn transition(&mut self, next: DeviceState) {
        debug!("EPD state: {} -> {}", self.state, next);
        self.state = next;
    }

    fn expect_state(&self, operation: &'static str, expected: DeviceState) -> DisplayResult<()> {
        if self.state != expected {
            warn!("Cannot {} while panel is {}", operation, self.state);
            return Err(DisplayError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    /// 执行一段硬件操作，失败时状态退回 `Uninitialized`
    fn guarded<T>(&mut self, op: impl FnOnce(&mut Self) -> DisplayResult<T>) -> DisplayResult<T> {
        let result = op(self);
        if let Err(e) = &result {
            error!("EPD operation failed: {}", e);
            self.state = DeviceState::Uninitialized;
        }
        result
    }

    fn send_command(&mut self, command: Command) -> DisplayResult<()> {
        self.dc.set_low().map_err(pin_error)?;
        self.spi.write(&[command.addr()]).map_err(spi_error)
    }

    fn send_data(&mut self, data: u8) -> DisplayResult<()> {
        self.dc.set_high().map_err(pin_error)?;
        self.spi.write(&[data]).map_err(spi_error)
    }

    fn send(&mut self, command: Command, params: &[u8]) -> DisplayResult<()> {
        self.send_command(command)?;
        for &byte in params {
            self.send_data(byte)?;
        }
        Ok(())
    }

    /// 轮询忙信号直到达到 `level`，超过 `busy_timeout_ms` 返回超时错误
    pub fn wait_for_busy(&mut self, level: BusyLevel) -> DisplayResult<()> {
        trace!("e-Paper busy {:?}", level);
        let poll_ms = self.config.busy_poll_interval_ms.max(1);
        let mut waited_ms: u32 = 0;
        loop {
            let high = self.busy.is_high().map_err(pin_error)?;
            if high == (level == BusyLevel::High) {
                trace!("e-Paper busy {:?} release after {} ms", level, waited_ms);
                return Ok(());
            }
            if waited_ms >= self.config.busy_timeout_ms {
                error!("e-Paper busy line stuck, waited {} ms", waited_ms);
                return Err(DisplayError::Timeout { waited_ms });
            }
            self.delay.delay_ms(poll_ms);
            waited_ms = waited_ms.saturating_add(poll_ms);
        }
    }

    /// 上电后把 `bytes` 逐个写入显存
    fn transmit(&mut self, bytes: impl Iterator<Item = u8>) -> DisplayResult<()> {
        self.send_command(Command::PowerOn)?;
        self.wait_for_busy(BusyLevel::High)?;

        self.send_command(Command::DataStartTransmission)?;
        for byte in bytes {
            self.send_data(byte)?;
        }
        Ok(())
    }

    fn turn_on_display(&mut self) -> DisplayResult<()> {
        self.send(Command::DisplayRefresh, &[REFRESH_TRIGGER])?;
        self.wait_for_busy(BusyLevel::High)?;

        self.send(Command::PowerOff, &[POWER_OFF_PARAM])?;
        self.wait_for_busy(BusyLevel::High)
    }
}

impl<SPI, BUSY, DC, RST, DELAY> PanelDriver for Epd3in0g<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    fn state(&self) -> DeviceState {
        self.state
    }

    fn geometry(&self) -> PanelGeometry {
        PanelGeometry::EPD_3IN0G
    }

    fn reset(&mut self) -> DisplayResult<()> {
        self.guarded(|epd| {
            epd.rst.set_high().map_err(pin_error)?;
            epd.delay.delay_ms(RESET_HIGH_MS);
            epd.rst.set_low().map_err(pin_error)?;
            epd.delay.delay_ms(RESET_LOW_MS);
            epd.rst.set_high().map_err(pin_error)?;
            epd.delay.delay_ms(RESET_HIGH_MS);
            Ok(())
        })?;
        self.transition(DeviceState::AwaitingReset);
        Ok(())
    }

    fn initialize(&mut self) -> DisplayResult<()> {
        self.expect_state("initialize", DeviceState::AwaitingReset)?;
        self.guarded(|epd| {
            for (command, params) in INIT_SEQUENCE {
                epd.send(*command, params)?;
            }
            Ok(())
        })?;
        self.transition(DeviceState::Ready);
        info!("EPD initialized");
        Ok(())
    }

    fn write_framebuffer(&mut self, framebuffer: Framebuffer) -> DisplayResult<()> {
        self.expect_state("write framebuffer", DeviceState::Ready)?;
        let expected = self.geometry();
        let actual = framebuffer.geometry();
        if actual != expected {
            error!(
                "Framebuffer is {}x{}, panel is {}x{}",
                actual.width, actual.height, expected.width, expected.height
            );
            return Err(DisplayError::GeometryMismatch { expected, actual });
        }

        self.guarded(|epd| epd.transmit(framebuffer.iter().copied()))?;
        self.transition(DeviceState::Transmitting);
        Ok(())
    }

    fn refresh(&mut self) -> DisplayResult<()> {
        self.expect_state("refresh", DeviceState::Transmitting)?;
        self.transition(DeviceState::Refreshing);
        self.guarded(Self::turn_on_display)?;
        self.transition(DeviceState::Ready);
        Ok(())
    }

    fn clear(&mut self, color: u8) -> DisplayResult<()> {
        self.expect_state("clear", DeviceState::Ready)?;
        debug!("Clearing EPD with 0x{:02x}", color);
        self.guarded(|epd| epd.transmit(iter::repeat_n(color, Self::buffer_len())))?;
        self.transition(DeviceState::Transmitting);
        self.refresh()
    }

    fn sleep(&mut self) -> DisplayResult<()> {
        self.expect_state("sleep", DeviceState::Ready)?;
        self.guarded(|epd| {
            epd.send(Command::PowerOff, &[POWER_OFF_PARAM])?;
            epd.send(Command::DeepSleep, &[DEEP_SLEEP_CHECK])?;
            epd.delay.delay_ms(SLEEP_SETTLE_MS);
            Ok(())
        })?;
        self.transition(DeviceState::Sleeping);
        Ok(())
    }
}

fn spi_error<E: spi::Error>(e: E) -> DisplayError {
    DisplayError::Spi(e.kind())
}

fn pin_error<E: digital::Error>(e: E) -> DisplayError {
    DisplayError::Pin(e.kind())
}
