//! 墨水屏驱动

pub mod command;
pub mod epd3in0g;

pub use command::Command;
pub use epd3in0g::*;

use lxx_frame_common::*;

use crate::render::Framebuffer;

/// 面板生命周期操作
///
/// 状态转换：`reset` 任意状态 → `AwaitingReset`，`initialize` → `Ready`，
/// `write_framebuffer` → `Transmitting`，`refresh` → `Ready`，`sleep` → `Sleeping`。
/// 传输失败或忙等待超时后状态回到 `Uninitialized`，只能重新 `reset`。
pub trait PanelDriver {
    fn state(&self) -> DeviceState;

    fn geometry(&self) -> PanelGeometry;

    fn reset(&mut self) -> DisplayResult<()>;

    fn initialize(&mut self) -> DisplayResult<()>;

    /// 帧缓冲区发送后即被释放
    fn write_framebuffer(&mut self, framebuffer: Framebuffer) -> DisplayResult<()>;

    fn refresh(&mut self) -> DisplayResult<()>;

    /// 整屏写入同一个字节后刷新
    fn clear(&mut self, color: u8) -> DisplayResult<()>;

    fn sleep(&mut self) -> DisplayResult<()>;

    fn init(&mut self) -> DisplayResult<()> {
        self.reset()?;
        self.initialize()
    }

    fn display(&mut self, framebuffer: Framebuffer) -> DisplayResult<()> {
        self.write_framebuffer(framebuffer)?;
        self.refresh()
    }

    /// 超时或传输错误后重新复位、初始化
    fn recover(&mut self) -> DisplayResult<()> {
        warn!("Recovering EPD from {}", self.state());
        self.init()
    }
}
