use alloc::vec::Vec;

use lxx_frame_common::*;

use super::BitmapDescriptor;
use crate::memory::try_zeroed;

/// 一行解码结果，`pixels` 借用自解码器内部的行缓冲区
#[derive(Debug)]
pub struct DecodedRow<'r> {
    /// 在数据流中的序号（0 为 BMP 最底行）
    pub stream_index: u32,
    /// 对应的面板行（自上而下）
    pub panel_y: u32,
    pub pixels: &'r [u8],
    pub outcome: ReadOutcome,
}

/// 逐行读取像素数据，始终只持有一行大小的缓冲区
///
/// 数据流提前结束时，当前行剩余部分补零并记录截断，后续各行直接补零，
/// 不再调用 `read`。
pub struct RowStreamDecoder<'s, S: ?Sized> {
    source: &'s mut S,
    row: Vec<u8>,
    height: u32,
    next_row: u32,
    received: usize,
    truncated_rows: u32,
    exhausted: bool,
}

impl<'s, S> RowStreamDecoder<'s, S>
where
    S: ByteSource + ?Sized,
{
    pub fn new(source: &'s mut S, descriptor: &BitmapDescriptor) -> FrameResult<Self> {
        let row = try_zeroed(descriptor.row_stride_padded())?;
        Ok(Self {
            source,
            row,
            height: descriptor.height,
            next_row: 0,
            received: 0,
            truncated_rows: 0,
            exhausted: false,
        })
    }

    pub fn row_stride(&self) -> usize {
        self.row.len()
    }

    pub fn truncated_rows(&self) -> u32 {
        self.truncated_rows
    }

    pub fn bytes_received(&self) -> usize {
        self.received
    }

    pub fn next_row(&mut self) -> FrameResult<Option<DecodedRow<'_>>> {
        if self.next_row >= self.height {
            return Ok(None);
        }
        let stream_index = self.next_row;
        self.next_row += 1;

        let stride = self.row.len();
        let outcome = if self.exhausted {
            self.row.fill(0);
            ReadOutcome::new(0, stride)
        } else {
            let outcome = self.source.read_chunked(&mut self.row, DEFAULT_READ_CHUNK)?;
            if !outcome.is_complete {
                warn!(
                    "End of stream reached prematurely at row {}, row byte {}/{}",
                    stream_index, outcome.bytes_read, stride
                );
                self.row[outcome.bytes_read..].fill(0);
                self.exhausted = true;
            }
            outcome
        };

        self.received += outcome.bytes_read;
        if !outcome.is_complete {
            self.truncated_rows += 1;
        }

        Ok(Some(DecodedRow {
            stream_index,
            panel_y: self.height - 1 - stream_index,
            pixels: &self.row,
            outcome,
        }))
    }

    /// 所有行都完整时返回 `Ok`，否则返回截断错误
    pub fn finish(self) -> FrameResult<()> {
        if self.truncated_rows == 0 {
            return Ok(());
        }
        let expected = self.row.len() * self.height as usize;
        warn!(
            "Incomplete pixel data: {} of {} rows truncated, {}/{} bytes received",
            self.truncated_rows, self.height, self.received, expected
        );
        Err(FrameError::TruncatedStream {
            expected,
            received: self.received,
        })
    }
}
