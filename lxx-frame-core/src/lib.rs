//! 四色墨水屏相框核心：流式 BMP 解码、有序抖动量化、2bit 帧缓冲区打包、
//! 面板驱动状态机，以及一次唤醒周期的业务流程。

#![no_std]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod bmp;
pub mod driver;
pub mod memory;
pub mod render;
pub mod services;

pub use driver::{Epd3in0g, PanelDriver};
pub use render::{Framebuffer, Quantizer, decode_bitmap, quantize};
pub use services::{CycleContent, CycleReport, DisplayService, RefreshCycle, RenderOutcome};
