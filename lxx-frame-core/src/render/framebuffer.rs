//! 帧缓冲区管理（2bit/像素，4色）

use alloc::vec::Vec;
use core::ops::Deref;

use lxx_frame_common::*;

use super::Quantizer;
use crate::memory::try_filled;

/// BMP 像素按 B、G、R 顺序存储
const BYTES_PER_PIXEL: usize = 3;

/// 打包好的帧缓冲区，每字节4个像素，高位在左
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Framebuffer {
    /// 创建全白的帧缓冲区
    pub fn try_new(geometry: PanelGeometry) -> FrameResult<Self> {
        Self::try_filled(geometry, PaletteIndex::White.fill_byte())
    }

    /// 创建每个字节都为 `byte` 的帧缓冲区
    pub fn try_filled(geometry: PanelGeometry, byte: u8) -> FrameResult<Self> {
        let data = try_filled(geometry.framebuffer_len(), byte)?;
        Ok(Self {
            width: geometry.width,
            height: geometry.height,
            data,
        })
    }

    pub fn geometry(&self) -> PanelGeometry {
        PanelGeometry::new(self.width, self.height)
    }

    fn locate(&self, x: u32, y: u32) -> (usize, u32) {
        let index = (x as usize + y as usize * self.width as usize) / 4;
        let shift = (3 - (x % 4)) * 2;
        (index, shift)
    }

    /// 设置指定位置的像素颜色，越界坐标忽略
    pub fn set_pixel(&mut self, x: u32, y: u32, color: PaletteIndex) {
        if x >= self.width || y >= self.height {
            return;
        }

        let (index, shift) = self.locate(x, y);
        // 清除原有颜色，设置新颜色
        self.data[index] &= !(0b11 << shift);
        self.data[index] |= color.bits() << shift;
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<PaletteIndex> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let (index, shift) = self.locate(x, y);
        Some(PaletteIndex::from_bits(self.data[index] >> shift))
    }

    /// 量化一行 BGR 像素并写入第 `y` 行，从左到右依次处理
    ///
    /// `row` 不足以覆盖的列（填充区）写为白色。
    pub fn pack_row(&mut self, y: u32, row: &[u8], quantizer: &Quantizer) {
        for x in 0..self.width {
            let offset = x as usize * BYTES_PER_PIXEL;
            let color = match row.get(offset..offset + BYTES_PER_PIXEL) {
                Some(&[b, g, r]) => quantizer.quantize(Rgb::new(r, g, b), x, y),
                _ => PaletteIndex::White,
            };
            self.set_pixel(x, y, color);
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl Deref for Framebuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn geometry(width: u32, height: u32) -> PanelGeometry {
        PanelGeometry::new(width, height)
    }

    #[test]
    fn new_buffer_is_white() {
        let fb = Framebuffer::try_new(PanelGeometry::EPD_3IN0G).unwrap();
        assert_eq!(fb.len(), 168 * 400 / 4);
        assert!(fb.iter().all(|&b| b == 0x55));
        assert_eq!(fb.pixel(167, 399), Some(PaletteIndex::White));
        assert_eq!(fb.pixel(168, 0), None);
    }

    #[test]
    fn leftmost_pixel_uses_high_bits() {
        let mut fb = Framebuffer::try_filled(geometry(8, 1), 0x00).unwrap();
        fb.set_pixel(0, 0, PaletteIndex::Red);
        fb.set_pixel(5, 0, PaletteIndex::Yellow);
        assert_eq!(fb.as_bytes(), &[0b1100_0000, 0b0010_0000]);
    }

    #[test]
    fn set_pixel_overwrites_previous_value() {
        let mut fb = Framebuffer::try_filled(geometry(4, 1), 0xFF).unwrap();
        fb.set_pixel(2, 0, PaletteIndex::White);
        assert_eq!(fb.as_bytes(), &[0b1111_0111]);
        fb.set_pixel(9, 0, PaletteIndex::Black);
        assert_eq!(fb.as_bytes(), &[0b1111_0111]);
    }

    #[test]
    fn every_slot_is_written_when_width_divides_by_four() {
        // 从全红开始，写入全黑行后不应留下任何非零位
        let mut fb = Framebuffer::try_filled(geometry(12, 3), 0xFF).unwrap();
        let black_row = vec![0u8; 12 * 3];
        let quantizer = Quantizer::default();
        for y in 0..3 {
            fb.pack_row(y, &black_row, &quantizer);
        }
        assert!(fb.iter().all(|&b| b == 0x00));
    }

    #[test]
    fn rows_are_laid_out_row_major() {
        let mut fb = Framebuffer::try_new(PanelGeometry::EPD_3IN0G).unwrap();
        fb.set_pixel(0, 1, PaletteIndex::Black);
        fb.set_pixel(167, 1, PaletteIndex::Red);
        assert_eq!(fb[42], 0b0001_0101);
        assert_eq!(fb[83], 0b0101_0111);
        assert_eq!(fb[41], 0x55);
        assert_eq!(fb[84], 0x55);
    }

    #[test]
    fn short_row_is_padded_with_white() {
        let mut fb = Framebuffer::try_filled(geometry(4, 1), 0x00).unwrap();
        let quantizer = Quantizer::default();
        // 只有两个完整像素，第三个像素缺一个字节
        let row = [0, 0, 255, 0, 0, 255, 0, 0];
        fb.pack_row(0, &row, &quantizer);
        assert_eq!(
            [0, 1, 2, 3].map(|x| fb.pixel(x, 0)),
            [
                Some(PaletteIndex::Red),
                Some(PaletteIndex::Red),
                Some(PaletteIndex::White),
                Some(PaletteIndex::White)
            ]
        );
    }

    #[test]
    fn pack_row_reads_bgr_order() {
        let mut fb = Framebuffer::try_new(geometry(4, 1)).unwrap();
        let quantizer = Quantizer::default();
        // B=0, G=255, R=255 -> 黄色
        let row = [0, 255, 255].repeat(4);
        fb.pack_row(0, &row, &quantizer);
        assert_eq!(fb.as_bytes(), &[PaletteIndex::Yellow.fill_byte()]);
    }
}
