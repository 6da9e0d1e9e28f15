//! 流式 BMP 读取
//!
//! 只支持未压缩、24位、自底向上存储的位图，尺寸必须与面板一致。
//! 头部跳过与像素行读取都通过有界的顺序读取完成，不需要 seek。

pub mod header;
pub mod rows;

pub use header::*;
pub use rows::*;
