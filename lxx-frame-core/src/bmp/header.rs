use lxx_frame_common::*;

pub const FILE_HEADER_LEN: usize = 14;
pub const INFO_HEADER_LEN: usize = 40;
/// 文件头加信息头
pub const HEADERS_LEN: usize = FILE_HEADER_LEN + INFO_HEADER_LEN;

pub const SIGNATURE: [u8; 2] = *b"BM";
pub const SUPPORTED_BIT_DEPTH: u16 = 24;
/// BI_RGB，未压缩
const COMPRESSION_NONE: u32 = 0;

/// 解析后的位图描述，生成后不再修改
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitmapDescriptor {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u16,
    pub pixel_data_offset: u32,
    pub file_size: u32,
}

impl BitmapDescriptor {
    /// 每行按4字节对齐后的长度
    pub const fn row_stride_padded(&self) -> usize {
        (self.bit_depth as usize * self.width as usize).div_ceil(32) * 4
    }

    /// 每行实际像素数据长度（不含填充）
    pub const fn row_stride_actual(&self) -> usize {
        self.width as usize * (self.bit_depth as usize / 8)
    }

    pub const fn pixel_data_len(&self) -> usize {
        self.row_stride_padded() * self.height as usize
    }
}

/// 从字节源读取并校验 BMP 文件头与信息头，然后读掉像素数据之前的多余字节
///
/// 校验在跳过之前完成，被拒绝的图像不会继续消耗数据流。
pub fn parse_header<S>(source: &mut S, geometry: &PanelGeometry) -> FrameResult<BitmapDescriptor>
where
    S: ByteSource + ?Sized,
{
    let mut file_header = [0u8; FILE_HEADER_LEN];
    read_exact(source, &mut file_header)?;

    if file_header[..2] != SIGNATURE {
        error!("Not a valid BMP file");
        return Err(FormatError::BadSignature {
            found: [file_header[0], file_header[1]],
        }
        .into());
    }

    let file_size = le_u32(&file_header, 2);
    let pixel_data_offset = le_u32(&file_header, 10);

    let mut info_header = [0u8; INFO_HEADER_LEN];
    read_exact(source, &mut info_header)?;

    let width = le_i32(&info_header, 4);
    let height = le_i32(&info_header, 8);
    let bit_depth = le_u16(&info_header, 14);
    let compression = le_u32(&info_header, 16);

    info!(
        "Image size: {}x{}, bit depth: {}, offset: {}, file size: {}",
        width, height, bit_depth, pixel_data_offset, file_size
    );

    let descriptor = validate(width, height, bit_depth, compression, geometry).map(|(width, height)| {
        BitmapDescriptor {
            width,
            height,
            bit_depth,
            pixel_data_offset,
            file_size,
        }
    })?;

    skip_to_pixel_data(source, pixel_data_offset)?;

    Ok(descriptor)
}

fn validate(
    width: i32,
    height: i32,
    bit_depth: u16,
    compression: u32,
    geometry: &PanelGeometry,
) -> Result<(u32, u32), FormatError> {
    let dimensions = u32::try_from(width).ok().zip(u32::try_from(height).ok());
    let (w, h) = match dimensions {
        Some((w, h)) if w == geometry.width && h == geometry.height => (w, h),
        _ => {
            error!(
                "BMP size ({}x{}) does not match EPD size ({}x{})",
                width, height, geometry.width, geometry.height
            );
            return Err(FormatError::DimensionMismatch {
                width,
                height,
                expected_width: geometry.width,
                expected_height: geometry.height,
            });
        }
    };

    if bit_depth != SUPPORTED_BIT_DEPTH {
        error!("Unsupported bit depth: {}", bit_depth);
        return Err(FormatError::UnsupportedBitDepth(bit_depth));
    }

    if compression != COMPRESSION_NONE {
        error!("Unsupported compression: {}", compression);
        return Err(FormatError::UnsupportedCompression(compression));
    }

    Ok((w, h))
}

fn skip_to_pixel_data<S>(source: &mut S, pixel_data_offset: u32) -> FrameResult<()>
where
    S: ByteSource + ?Sized,
{
    let offset = pixel_data_offset as usize;
    if offset < HEADERS_LEN {
        // 偏移小于已读头部，按漂移处理，不视为损坏
        warn!(
            "Pixel data offset ({}) is smaller than header size ({}), not skipping",
            offset, HEADERS_LEN
        );
        return Ok(());
    }

    let bytes_to_skip = offset - HEADERS_LEN;
    if bytes_to_skip == 0 {
        return Ok(());
    }

    debug!("Skipping {} bytes to reach pixel data", bytes_to_skip);
    let outcome = source.skip(bytes_to_skip, DEFAULT_READ_CHUNK)?;
    if !outcome.is_complete {
        error!(
            "Stream closed while skipping {} bytes, skipped only {}",
            bytes_to_skip, outcome.bytes_read
        );
        return Err(FrameError::TruncatedStream {
            expected: bytes_to_skip,
            received: outcome.bytes_read,
        });
    }
    Ok(())
}

fn read_exact<S>(source: &mut S, buf: &mut [u8]) -> FrameResult<()>
where
    S: ByteSource + ?Sized,
{
    let outcome = source.read_chunked(buf, DEFAULT_READ_CHUNK)?;
    if !outcome.is_complete {
        error!(
            "Failed to read BMP header: got {} of {} bytes",
            outcome.bytes_read,
            buf.len()
        );
        return Err(FrameError::TruncatedStream {
            expected: buf.len(),
            received: outcome.bytes_read,
        });
    }
    Ok(())
}

fn le_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn le_i32(bytes: &[u8], at: usize) -> i32 {
    le_u32(bytes, at) as i32
}
