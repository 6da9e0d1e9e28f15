use lxx_frame_common::*;

/// 2x2 Bayer 矩阵，按 `[y % 2][x % 2]` 取值
pub const BAYER_2X2: [[u8; 2]; 2] = [[0, 2], [3, 1]];

/// 有序抖动的偏移量：`floor((bayer / 3 - 0.5) * factor)`
///
/// 用整数计算 `floor((2 * bayer - 3) * factor / 6)`，与浮点公式结果一致。
pub const fn dither_offset(x: u32, y: u32, factor: i32) -> i32 {
    let bayer = BAYER_2X2[(y % 2) as usize][(x % 2) as usize] as i32;
    (2 * bayer * factor - 3 * factor).div_euclid(6)
}

/// 按调色板顺序找平方距离最小的颜色，距离相同取较小索引
pub fn nearest(color: Rgb, palette: &Palette) -> PaletteIndex {
    let mut best = PaletteIndex::Black;
    let mut best_distance = u32::MAX;
    for (index, entry) in PaletteIndex::ALL.into_iter().zip(palette.entries()) {
        let distance = squared_distance(color, *entry);
        if distance < best_distance {
            best = index;
            best_distance = distance;
            if distance == 0 {
                break;
            }
        }
    }
    best
}

fn squared_distance(a: Rgb, b: Rgb) -> u32 {
    let dr = a.r as i32 - b.r as i32;
    let dg = a.g as i32 - b.g as i32;
    let db = a.b as i32 - b.b as i32;
    (dr * dr + dg * dg + db * db) as u32
}

fn offset_channel(value: u8, offset: i32) -> u8 {
    (value as i32 + offset).clamp(0, 255) as u8
}

/// 使用默认抖动强度量化单个像素
pub fn quantize(r: u8, g: u8, b: u8, x: u32, y: u32, palette: &Palette) -> PaletteIndex {
    let offset = dither_offset(x, y, DEFAULT_DITHER_FACTOR);
    nearest(
        Rgb::new(
            offset_channel(r, offset),
            offset_channel(g, offset),
            offset_channel(b, offset),
        ),
        palette,
    )
}

/// 带配置的量化器，四个抖动偏移量在构造时算好
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantizer {
    palette: Palette,
    dither_factor: i32,
    offsets: [[i32; 2]; 2],
}

impl Quantizer {
    pub fn new(palette: Palette, dither_factor: i32) -> Self {
        let mut offsets = [[0; 2]; 2];
        for (y, row) in offsets.iter_mut().enumerate() {
            for (x, offset) in row.iter_mut().enumerate() {
                *offset = dither_offset(x as u32, y as u32, dither_factor);
            }
        }
        Self {
            palette,
            dither_factor,
            offsets,
        }
    }

    pub fn dither_factor(&self) -> i32 {
        self.dither_factor
    }

    pub fn quantize(&self, color: Rgb, x: u32, y: u32) -> PaletteIndex {
        let offset = self.offsets[(y % 2) as usize][(x % 2) as usize];
        let adjusted = Rgb::new(
            offset_channel(color.r, offset),
            offset_channel(color.g, offset),
            offset_channel(color.b, offset),
        );
        nearest(adjusted, &self.palette)
    }
}

impl Default for Quantizer {
    fn default() -> Self {
        Self::new(Palette::EPD_3IN0G, DEFAULT_DITHER_FACTOR)
    }
}

impl From<&RenderConfig> for Quantizer {
    fn from(config: &RenderConfig) -> Self {
        Self::new(config.palette, config.dither_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PALETTE: Palette = Palette::EPD_3IN0G;

    #[test]
    fn offsets_for_default_factor() {
        assert_eq!(dither_offset(0, 0, 32), -16);
        assert_eq!(dither_offset(1, 1, 32), -6);
        assert_eq!(dither_offset(1, 0, 32), 5);
        assert_eq!(dither_offset(0, 1, 32), 16);
        // 矩阵按 2 循环
        assert_eq!(dither_offset(7, 9, 32), dither_offset(1, 1, 32));
    }

    #[test]
    fn zero_factor_disables_dithering() {
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(dither_offset(x, y, 0), 0);
        }
    }

    #[test]
    fn palette_colors_map_to_themselves() {
        let quantizer = Quantizer::new(PALETTE, 0);
        for index in PaletteIndex::ALL {
            let Rgb { r, g, b } = PALETTE.color(index);
            assert_eq!(quantizer.quantize(Rgb::new(r, g, b), 3, 5), index);
        }
    }

    #[test]
    fn pure_colors_survive_dithering() {
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(quantize(0, 0, 0, x, y, &PALETTE), PaletteIndex::Black);
            assert_eq!(quantize(255, 255, 255, x, y, &PALETTE), PaletteIndex::White);
            assert_eq!(quantize(255, 255, 0, x, y, &PALETTE), PaletteIndex::Yellow);
            assert_eq!(quantize(255, 0, 0, x, y, &PALETTE), PaletteIndex::Red);
        }
    }

    #[test]
    fn tie_goes_to_lowest_index() {
        // 两个相同条目，距离相同时取前一个
        let palette = Palette::new([
            Rgb::new(10, 10, 10),
            Rgb::new(10, 10, 10),
            Rgb::new(255, 255, 0),
            Rgb::new(255, 0, 0),
        ]);
        assert_eq!(nearest(Rgb::new(12, 12, 12), &palette), PaletteIndex::Black);
        // (100,155,0) 到黑色与黄色距离相同
        assert_eq!(nearest(Rgb::new(100, 155, 0), &PALETTE), PaletteIndex::Black);
    }

    #[test]
    fn mid_gray_follows_bayer_pattern() {
        assert_eq!(quantize(135, 135, 135, 0, 0, &PALETTE), PaletteIndex::Black);
        assert_eq!(quantize(135, 135, 135, 1, 1, &PALETTE), PaletteIndex::White);

        assert_eq!(quantize(128, 128, 128, 0, 0, &PALETTE), PaletteIndex::Black);
        assert_eq!(quantize(128, 128, 128, 1, 0, &PALETTE), PaletteIndex::White);
    }

    #[test]
    fn configured_quantizer_matches_free_function() {
        let quantizer = Quantizer::from(&RenderConfig::default());
        assert_eq!(quantizer.dither_factor(), 32);
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(
                quantizer.quantize(Rgb::new(128, 100, 60), x, y),
                quantize(128, 100, 60, x, y, &PALETTE)
            );
        }
    }

    #[test]
    fn channels_are_clamped() {
        // 偏移 +16 不会让 250 溢出
        assert_eq!(quantize(250, 250, 250, 0, 1, &PALETTE), PaletteIndex::White);
        // 偏移 -16 不会让 5 下溢
        assert_eq!(quantize(5, 5, 5, 0, 0, &PALETTE), PaletteIndex::Black);
    }

    proptest! {
        #[test]
        fn quantize_is_deterministic(r: u8, g: u8, b: u8, x in 0u32..400, y in 0u32..400) {
            let first = quantize(r, g, b, x, y, &PALETTE);
            prop_assert_eq!(first, quantize(r, g, b, x, y, &PALETTE));
            prop_assert_eq!(first, quantize(r, g, b, x % 2, y % 2, &PALETTE));
        }

        #[test]
        fn exact_palette_hit_wins_without_dithering(index in 0u8..4, x: u32, y: u32) {
            let index = PaletteIndex::from_bits(index);
            let quantizer = Quantizer::new(PALETTE, 0);
            prop_assert_eq!(quantizer.quantize(PALETTE.color(index), x, y), index);
        }
    }
}
