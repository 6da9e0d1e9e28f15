use lxx_frame_common::*;

use super::{Framebuffer, Quantizer};
use crate::bmp::{BitmapDescriptor, RowStreamDecoder, parse_header};

/// 每处理多少行输出一次进度
const PROGRESS_INTERVAL: u32 = 50;

/// 从字节源解码整幅位图，返回打包好的帧缓冲区
///
/// 数据流提前结束时返回 `FrameError::TruncatedStream`，部分结果随之丢弃。
pub fn decode_bitmap<S>(source: &mut S, config: &RenderConfig) -> FrameResult<Framebuffer>
where
    S: ByteSource + ?Sized,
{
    let descriptor = parse_header(source, &config.geometry)?;
    let mut framebuffer = Framebuffer::try_new(config.geometry)?;
    decode_rows(source, &descriptor, &Quantizer::from(config), &mut framebuffer)?;
    Ok(framebuffer)
}

/// 逐行解码像素数据写入 `framebuffer`
///
/// 截断的行补零后照常量化，因此出错时 `framebuffer` 中保留了已收到的部分。
pub fn decode_rows<S>(
    source: &mut S,
    descriptor: &BitmapDescriptor,
    quantizer: &Quantizer,
    framebuffer: &mut Framebuffer,
) -> FrameResult<()>
where
    S: ByteSource + ?Sized,
{
    let mut decoder = RowStreamDecoder::new(source, descriptor)?;
    let row_bytes = descriptor.row_stride_actual();
    let height = descriptor.height;

    while let Some(row) = decoder.next_row()? {
        let pixels = &row.pixels[..row_bytes.min(row.pixels.len())];
        framebuffer.pack_row(row.panel_y, pixels, quantizer);

        let done = row.stream_index + 1;
        if done % PROGRESS_INTERVAL == 0 {
            debug!("Processed {}/{} rows", done, height);
        }
    }

    decoder.finish()
}
