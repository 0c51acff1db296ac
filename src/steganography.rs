//! # 像素变换核心模块
//!
//! 半字节交换 (`reveal`) 与半字节合并 (`hide`) 两种变换，
//! 以及在像素阵列上逐行读取、变换、回写的流式遍历。

use crate::bmp::RowLayout;
use crate::constants::{BYTES_PER_PIXEL, HIGH_NIBBLE_MASK};
use crate::error::StegoError;
use crate::header::BmpHeaders;
use log::{debug, trace};
use std::io::{self, Read, Seek, SeekFrom, Write};

/// 交换一个字节的高 4 位与低 4 位。该变换是自逆的。
pub fn swap_nibbles(byte: u8) -> u8 {
    byte.rotate_left(4)
}

/// 保留 `carrier` 的高 4 位，并把 `payload` 的高 4 位放入低 4 位。
pub fn merge_nibbles(carrier: u8, payload: u8) -> u8 {
    (carrier & HIGH_NIBBLE_MASK) | ((payload & HIGH_NIBBLE_MASK) >> 4)
}

/// 磁盘上的一个像素，通道顺序为 (蓝, 绿, 红)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
}

impl Pixel {
    pub fn from_bytes(bytes: [u8; BYTES_PER_PIXEL]) -> Self {
        let [blue, green, red] = bytes;
        Self { blue, green, red }
    }

    pub fn to_bytes(self) -> [u8; BYTES_PER_PIXEL] {
        [self.blue, self.green, self.red]
    }

    /// 对三个通道分别独立地应用 `f`。
    pub fn map(self, f: impl Fn(u8) -> u8) -> Self {
        Self {
            blue: f(self.blue),
            green: f(self.green),
            red: f(self.red),
        }
    }

    /// 将两个像素的对应通道两两组合。
    pub fn zip_map(self, other: Self, f: impl Fn(u8, u8) -> u8) -> Self {
        Self {
            blue: f(self.blue, other.blue),
            green: f(self.green, other.green),
            red: f(self.red, other.red),
        }
    }

    pub fn swapped(self) -> Self {
        self.map(swap_nibbles)
    }

    pub fn merged_with(self, payload: Self) -> Self {
        self.zip_map(payload, merge_nibbles)
    }
}

/// 一次完整遍历处理的行数与像素数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalkStats {
    pub rows: u32,
    pub pixels: u64,
}

fn pixels_mut(row: &mut [u8]) -> impl Iterator<Item = &mut [u8]> {
    row.chunks_exact_mut(BYTES_PER_PIXEL)
}

fn read_pixel(chunk: &[u8]) -> Pixel {
    Pixel::from_bytes([chunk[0], chunk[1], chunk[2]])
}

/// 对一行像素字节 (不含填充) 原地做半字节交换。
pub fn reveal_row(row: &mut [u8]) {
    pixels_mut(row).for_each(|chunk| {
        let swapped = read_pixel(chunk).swapped();
        chunk.copy_from_slice(&swapped.to_bytes());
    });
}

/// 将 `payload` 行的高半字节合并进 `carrier` 行的低半字节。两行长度必须一致。
pub fn hide_row(carrier: &mut [u8], payload: &[u8]) {
    debug_assert_eq!(carrier.len(), payload.len());
    pixels_mut(carrier)
        .zip(payload.chunks_exact(BYTES_PER_PIXEL))
        .for_each(|(c, p)| {
            let merged = read_pixel(c).merged_with(read_pixel(p));
            c.copy_from_slice(&merged.to_bytes());
        });
}

/// 为一行像素分配缓冲区，长度不超过整个流。
///
/// 头部声明的宽度可能远大于文件本身，此时只需容纳流中实际存在的字节。
fn row_buffer<S: Seek>(stream: &mut S, layout: &RowLayout) -> Result<Vec<u8>, StegoError> {
    if layout.rows == 0 {
        return Ok(Vec::new());
    }
    let len = stream.seek(SeekFrom::End(0))?;
    Ok(vec![0u8; layout.pixel_bytes().min(len) as usize])
}

/// 尽量读满 `buf`，返回实际读到的字节数；只有在流结束时才会少于 `buf.len()`。
fn fill_row<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, StegoError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// 向下取整到完整像素的字节数。
fn whole_pixels(bytes: usize) -> usize {
    bytes - bytes % BYTES_PER_PIXEL
}

/// 回退 `read` 个字节，即本行读取的起点，然后写回 `buf`。
fn rewind_and_write<W: Write + Seek>(
    writer: &mut W,
    read: usize,
    buf: &[u8],
) -> Result<(), StegoError> {
    writer.seek(SeekFrom::Current(-(read as i64)))?;
    writer.write_all(buf)?;
    Ok(())
}

fn skip_padding<S: Seek>(stream: &mut S, layout: &RowLayout) -> Result<(), StegoError> {
    if layout.padding > 0 {
        stream.seek(SeekFrom::Current(i64::from(layout.padding)))?;
    }
    Ok(())
}

/// 对 `stream` 中的整个像素阵列原地做半字节交换。
///
/// 按磁盘顺序逐行处理：读取一行像素、变换、回退到行首写回，再跳过该行的填充字节。
/// 填充字节与头部都不会被修改。像素数据提前结束时，最后一个完整像素之前的内容
/// 都已写回，不做回滚。
///
/// # Errors
///
/// * [`StegoError::TruncatedPixelData`] - 像素数据在某一行结束前耗尽。
/// * [`StegoError::Io`] - 定位或写入失败。
pub fn reveal_pixels<S: Read + Write + Seek>(
    stream: &mut S,
    headers: &BmpHeaders,
) -> Result<WalkStats, StegoError> {
    let layout = RowLayout::of(&headers.info);
    let mut row = row_buffer(stream, &layout)?;
    stream.seek(SeekFrom::Start(u64::from(headers.file.offset)))?;

    for r in 0..layout.rows {
        let read = fill_row(stream, &mut row)?;
        let whole = whole_pixels(read);
        reveal_row(&mut row[..whole]);
        rewind_and_write(stream, read, &row[..whole])?;
        if (read as u64) < layout.pixel_bytes() {
            stream.flush()?;
            return Err(StegoError::TruncatedPixelData { row: r });
        }
        skip_padding(stream, &layout)?;
        trace!("row {r} swapped");
    }
    stream.flush()?;

    debug!(
        "swapped {} pixels in {} rows (padding {})",
        layout.pixel_count(),
        layout.rows,
        layout.padding
    );
    Ok(WalkStats {
        rows: layout.rows,
        pixels: layout.pixel_count(),
    })
}

/// 确认载体与载荷的宽高完全一致。
pub fn check_dimensions(carrier: &BmpHeaders, payload: &BmpHeaders) -> Result<(), StegoError> {
    if carrier.dimensions() != payload.dimensions() {
        return Err(StegoError::DimensionMismatch {
            carrier: carrier.dimensions(),
            payload: payload.dimensions(),
        });
    }
    Ok(())
}

/// 将 `payload` 像素的高半字节合并进 `carrier` 像素的低半字节，原地修改 `carrier`。
///
/// 尺寸检查在触碰任何像素之前完成，不一致时载体保持原样。
/// 两个流按各自的像素偏移定位，并以相同的行布局同步前进；`payload` 只读。
/// 任一文件的像素数据提前结束时，两者都完整读到的像素已经写回载体，不做回滚。
///
/// # Errors
///
/// * [`StegoError::DimensionMismatch`] - 两个文件的宽或高不同。
/// * [`StegoError::TruncatedPixelData`] - 任一文件的像素数据在某一行结束前耗尽。
/// * [`StegoError::Io`] - 定位或写入失败。
pub fn hide_pixels<C, P>(
    carrier: &mut C,
    carrier_headers: &BmpHeaders,
    payload: &mut P,
    payload_headers: &BmpHeaders,
) -> Result<WalkStats, StegoError>
where
    C: Read + Write + Seek,
    P: Read + Seek,
{
    check_dimensions(carrier_headers, payload_headers)?;

    let layout = RowLayout::of(&carrier_headers.info);
    debug_assert_eq!(layout, RowLayout::of(&payload_headers.info));

    let mut carrier_row = row_buffer(carrier, &layout)?;
    let mut payload_row = row_buffer(payload, &layout)?;
    carrier.seek(SeekFrom::Start(u64::from(carrier_headers.file.offset)))?;
    payload.seek(SeekFrom::Start(u64::from(payload_headers.file.offset)))?;

    for r in 0..layout.rows {
        let carrier_read = fill_row(carrier, &mut carrier_row)?;
        let payload_read = fill_row(payload, &mut payload_row)?;
        // 任一文件提前结束时，只合并两者都完整读到的像素
        let whole = whole_pixels(carrier_read.min(payload_read));
        hide_row(&mut carrier_row[..whole], &payload_row[..whole]);
        rewind_and_write(carrier, carrier_read, &carrier_row[..whole])?;
        if (whole as u64) < layout.pixel_bytes() {
            carrier.flush()?;
            return Err(StegoError::TruncatedPixelData { row: r });
        }
        skip_padding(carrier, &layout)?;
        skip_padding(payload, &layout)?;
        trace!("row {r} merged");
    }
    carrier.flush()?;

    debug!(
        "merged {} pixels in {} rows (padding {})",
        layout.pixel_count(),
        layout.rows,
        layout.padding
    );
    Ok(WalkStats {
        rows: layout.rows,
        pixels: layout.pixel_count(),
    })
}
