use alloc::vec::Vec;

use lxx_frame_common::{FrameError, FrameResult, error};

/// 申请 `len` 字节并填充 `byte`，内存不足时返回 `FrameError::Allocation` 而不是中止
pub fn try_filled(len: usize, byte: u8) -> FrameResult<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| {
        error!("Failed to allocate buffer: {} bytes", len);
        FrameError::Allocation { requested: len }
    })?;
    buffer.resize(len, byte);
    Ok(buffer)
}

pub fn try_zeroed(len: usize) -> FrameResult<Vec<u8>> {
    try_filled(len, 0)
}
