//! 位图到面板帧缓冲区的转换：有序抖动量化、2bit 打包与逐行解码流水线

pub mod framebuffer;
pub mod pipeline;
pub mod quantize;

pub use framebuffer::*;
pub use pipeline::*;
pub use quantize::*;
