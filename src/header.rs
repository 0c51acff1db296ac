//! # BMP 头部模型
//!
//! 定义文件头 ([`FileHeader`]) 与信息头 ([`InfoHeader`]) 的字节级精确表示。
//! 所有字段都按小端序、在固定偏移处逐一读写，不依赖任何结构体内存布局。

use crate::bmp::row_padding;
use crate::constants::{
    BMP_MAGIC, BYTES_PER_PIXEL, FILE_HEADER_SIZE, HEADERS_SIZE, INFO_HEADER_SIZE,
    SUPPORTED_BIT_COUNT,
};
use std::fmt;

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn i32_at(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// BMP 文件头 (14 字节)。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// 两字节格式标识，受支持的文件必须为 "BM"。
    pub magic: [u8; 2],
    /// 文件总大小 (字节)。
    pub size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    /// 从文件开头到第一个像素字节的偏移。
    pub offset: u32,
}

impl FileHeader {
    /// 按固定偏移解析 14 字节的文件头，不做任何校验。
    pub fn from_bytes(bytes: &[u8; FILE_HEADER_SIZE]) -> Self {
        Self {
            magic: [bytes[0], bytes[1]],
            size: u32_at(bytes, 2),
            reserved1: u16_at(bytes, 6),
            reserved2: u16_at(bytes, 8),
            offset: u32_at(bytes, 10),
        }
    }

    pub fn to_bytes(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut out = [0u8; FILE_HEADER_SIZE];
        out[0..2].copy_from_slice(&self.magic);
        out[2..6].copy_from_slice(&self.size.to_le_bytes());
        out[6..8].copy_from_slice(&self.reserved1.to_le_bytes());
        out[8..10].copy_from_slice(&self.reserved2.to_le_bytes());
        out[10..14].copy_from_slice(&self.offset.to_le_bytes());
        out
    }

    pub fn has_bmp_magic(&self) -> bool {
        self.magic == BMP_MAGIC
    }
}

/// BMP 信息头 (BITMAPINFOHEADER，40 字节)。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    pub width: i32,
    /// 负值表示像素阵列自上而下存储；行数始终取其绝对值。
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl InfoHeader {
    /// 按固定偏移解析 40 字节的信息头，不做任何校验。
    pub fn from_bytes(bytes: &[u8; INFO_HEADER_SIZE]) -> Self {
        Self {
            header_size: u32_at(bytes, 0),
            width: i32_at(bytes, 4),
            height: i32_at(bytes, 8),
            planes: u16_at(bytes, 12),
            bit_count: u16_at(bytes, 14),
            compression: u32_at(bytes, 16),
            image_size: u32_at(bytes, 20),
            x_pixels_per_meter: i32_at(bytes, 24),
            y_pixels_per_meter: i32_at(bytes, 28),
            colors_used: u32_at(bytes, 32),
            colors_important: u32_at(bytes, 36),
        }
    }

    pub fn to_bytes(&self) -> [u8; INFO_HEADER_SIZE] {
        let mut out = [0u8; INFO_HEADER_SIZE];
        out[0..4].copy_from_slice(&self.header_size.to_le_bytes());
        out[4..8].copy_from_slice(&self.width.to_le_bytes());
        out[8..12].copy_from_slice(&self.height.to_le_bytes());
        out[12..14].copy_from_slice(&self.planes.to_le_bytes());
        out[14..16].copy_from_slice(&self.bit_count.to_le_bytes());
        out[16..20].copy_from_slice(&self.compression.to_le_bytes());
        out[20..24].copy_from_slice(&self.image_size.to_le_bytes());
        out[24..28].copy_from_slice(&self.x_pixels_per_meter.to_le_bytes());
        out[28..32].copy_from_slice(&self.y_pixels_per_meter.to_le_bytes());
        out[32..36].copy_from_slice(&self.colors_used.to_le_bytes());
        out[36..40].copy_from_slice(&self.colors_important.to_le_bytes());
        out
    }

    /// 是否为唯一受支持的变体：40 字节信息头 + 24 位像素。
    pub fn is_supported_variant(&self) -> bool {
        self.header_size as usize == INFO_HEADER_SIZE && self.bit_count == SUPPORTED_BIT_COUNT
    }

    pub fn is_top_down(&self) -> bool {
        self.height < 0
    }
}

/// 一个 BMP 文件的两个头部。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeaders {
    pub file: FileHeader,
    pub info: InfoHeader,
}

impl BmpHeaders {
    /// 为给定尺寸构造一组合法的 24 位 BMP 头部，像素数据紧随头部之后。
    ///
    /// 负宽度按零列处理。像素阵列或文件大小超出 `u32` 范围时返回 `None`。
    pub fn for_dimensions(width: i32, height: i32) -> Option<Self> {
        let columns = width.max(0).unsigned_abs();
        let stride = u64::from(columns) * BYTES_PER_PIXEL as u64 + u64::from(row_padding(columns));
        let image_size = u32::try_from(stride.checked_mul(u64::from(height.unsigned_abs()))?).ok()?;
        let size = image_size.checked_add(HEADERS_SIZE as u32)?;

        Some(Self {
            file: FileHeader {
                magic: BMP_MAGIC,
                size,
                reserved1: 0,
                reserved2: 0,
                offset: HEADERS_SIZE as u32,
            },
            info: InfoHeader {
                header_size: INFO_HEADER_SIZE as u32,
                width,
                height,
                planes: 1,
                bit_count: SUPPORTED_BIT_COUNT,
                compression: 0,
                image_size,
                x_pixels_per_meter: 2835,
                y_pixels_per_meter: 2835,
                colors_used: 0,
                colors_important: 0,
            },
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADERS_SIZE] {
        let mut out = [0u8; HEADERS_SIZE];
        out[..FILE_HEADER_SIZE].copy_from_slice(&self.file.to_bytes());
        out[FILE_HEADER_SIZE..].copy_from_slice(&self.info.to_bytes());
        out
    }

    pub fn dimensions(&self) -> (i32, i32) {
        (self.info.width, self.info.height)
    }
}

impl fmt::Display for FileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Type: {}{}",
            char::from(self.magic[0]),
            char::from(self.magic[1])
        )?;
        writeln!(f, "Size: {}", self.size)?;
        writeln!(f, "Reserved1: {}", self.reserved1)?;
        writeln!(f, "Reserved2: {}", self.reserved2)?;
        writeln!(f, "Offset: {}", self.offset)
    }
}

impl fmt::Display for InfoHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HeaderSize: {}", self.header_size)?;
        writeln!(f, "Width: {}", self.width)?;
        writeln!(f, "Height: {}", self.height)?;
        writeln!(f, "Planes: {}", self.planes)?;
        writeln!(f, "BitCount: {}", self.bit_count)?;
        writeln!(f, "Compression: {}", self.compression)?;
        writeln!(f, "ImageSize: {}", self.image_size)?;
        writeln!(f, "XPixelsPerMeter: {}", self.x_pixels_per_meter)?;
        writeln!(f, "YPixelsPerMeter: {}", self.y_pixels_per_meter)?;
        writeln!(f, "ColorsUsed: {}", self.colors_used)?;
        writeln!(f, "ColorsImportant: {}", self.colors_important)
    }
}
