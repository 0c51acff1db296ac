//! # BMP 读取与校验模块
//!
//! 负责打开文件、解析两个头部，并拒绝受支持子集 (40 字节信息头 + 24 位像素)
//! 之外的一切输入。同时提供行填充计算 ([`row_padding`], [`RowLayout`])。

use crate::constants::{
    BYTES_PER_PIXEL, FILE_HEADER_SIZE, INFO_HEADER_SIZE, ROW_ALIGNMENT,
};
use crate::error::StegoError;
use crate::header::{BmpHeaders, FileHeader, InfoHeader};
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::path::Path;

/// 打开文件时所需的访问模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// 只读：用于 `info` 以及 `hide` 的载荷文件。
    ReadOnly,
    /// 读写：用于被原地修改的文件。
    ReadWrite,
}

/// 计算宽度为 `width` 像素的一行在末尾需要补齐的字节数，结果总在 `0..=3` 之间。
pub fn row_padding(width: u32) -> u32 {
    let row_bytes = u64::from(width) * BYTES_PER_PIXEL as u64;
    let alignment = ROW_ALIGNMENT as u64;
    ((alignment - row_bytes % alignment) % alignment) as u32
}

/// 由信息头推导出的像素阵列行布局，每个图像只计算一次。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    /// 每行像素数；负宽度按 0 处理。
    pub columns: u32,
    /// 行数，即 `|height|`。
    pub rows: u32,
    /// 每行末尾的填充字节数。
    pub padding: u32,
}

impl RowLayout {
    pub fn of(info: &InfoHeader) -> Self {
        let columns = info.width.max(0).unsigned_abs();
        Self {
            columns,
            rows: info.height.unsigned_abs(),
            padding: row_padding(columns),
        }
    }

    /// 一行中像素本身占用的字节数 (不含填充)。
    pub fn pixel_bytes(&self) -> u64 {
        u64::from(self.columns) * BYTES_PER_PIXEL as u64
    }

    /// 一行在磁盘上的总长度 (含填充)，总是 4 的倍数。
    pub fn stride(&self) -> u64 {
        self.pixel_bytes() + u64::from(self.padding)
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.columns) * u64::from(self.rows)
    }
}

fn read_header_bytes<R: Read, const N: usize>(reader: &mut R) -> Result<[u8; N], StegoError> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => StegoError::TruncatedHeader,
        _ => StegoError::Io(e),
    })?;
    Ok(buf)
}

/// 从当前位置 (应为文件开头) 依次读取并校验文件头与信息头。
///
/// 成功时读取位置恰好停在信息头之后；调用者在读取像素前应自行定位到
/// `FileHeader::offset`，因为头部与像素阵列之间不一定连续。
///
/// # Errors
///
/// * [`StegoError::TruncatedHeader`] - 可用字节不足 54 字节。
/// * [`StegoError::UnsupportedMagic`] - 前两个字节不是 "BM"。
/// * [`StegoError::UnsupportedVariant`] - 信息头不是 40 字节，或不是 24 位像素。
pub fn read_headers<R: Read>(reader: &mut R) -> Result<BmpHeaders, StegoError> {
    let file = FileHeader::from_bytes(&read_header_bytes::<_, FILE_HEADER_SIZE>(reader)?);
    if !file.has_bmp_magic() {
        return Err(StegoError::UnsupportedMagic { found: file.magic });
    }

    let info = InfoHeader::from_bytes(&read_header_bytes::<_, INFO_HEADER_SIZE>(reader)?);
    if !info.is_supported_variant() {
        return Err(StegoError::UnsupportedVariant {
            header_size: info.header_size,
            bit_count: info.bit_count,
        });
    }

    Ok(BmpHeaders { file, info })
}

/// 一个已打开并通过校验的 BMP 文件。
///
/// 文件句柄随值一同释放，任何提前返回的路径都会关闭文件。
#[derive(Debug)]
pub struct BmpFile {
    pub file: File,
    pub headers: BmpHeaders,
}

impl BmpFile {
    /// 以指定模式打开 `path` 并校验其头部。
    ///
    /// # Errors
    ///
    /// * [`StegoError::FileNotFound`] - 无法以所需模式打开文件。
    /// * 以及 [`read_headers`] 的所有校验错误。
    pub fn open(path: &Path, access: Access) -> Result<Self, StegoError> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(access == Access::ReadWrite)
            .open(path)
            .map_err(|source| StegoError::FileNotFound {
                path: path.to_path_buf(),
                source,
            })?;

        let headers = read_headers(&mut file)?;
        debug!(
            "{}: {}x{} px, pixel data at offset {}",
            path.display(),
            headers.info.width,
            headers.info.height,
            headers.file.offset
        );

        Ok(Self { file, headers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use std::io::Cursor;

    #[test]
    fn padding_rounds_rows_up_to_four_bytes() {
        assert_eq!(row_padding(5), 1);
        assert_eq!(row_padding(4), 0);
        assert_eq!(row_padding(1), 1);
        assert_eq!(row_padding(2), 2);
        assert_eq!(row_padding(3), 3);
        assert_eq!(row_padding(0), 0);
        assert_eq!(row_padding(u32::MAX), 3);
    }

    #[test]
    fn layout_uses_absolute_height_and_clamps_negative_width() {
        let mut info = BmpHeaders::for_dimensions(5, -3).unwrap().info;
        let layout = RowLayout::of(&info);
        assert_eq!(layout.columns, 5);
        assert_eq!(layout.rows, 3);
        assert_eq!(layout.padding, 1);
        assert_eq!(layout.pixel_bytes(), 15);
        assert_eq!(layout.stride(), 16);
        assert_eq!(layout.pixel_count(), 15);

        info.width = -4;
        let layout = RowLayout::of(&info);
        assert_eq!(layout.columns, 0);
        assert_eq!(layout.stride(), 0);
    }

    #[test]
    fn valid_headers_leave_cursor_after_info_header() {
        let headers = BmpHeaders::for_dimensions(2, 2).unwrap();
        let mut bytes = headers.to_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 16]);

        let mut cursor = Cursor::new(bytes);
        let parsed = read_headers(&mut cursor).unwrap();
        assert_eq!(parsed, headers);
        assert_eq!(cursor.position(), 54);
    }

    #[test]
    fn short_input_is_a_truncated_header() {
        let bytes = BmpHeaders::for_dimensions(2, 2).unwrap().to_bytes();
        for len in [0, 1, 13, 14, 53] {
            let err = read_headers(&mut Cursor::new(&bytes[..len])).unwrap_err();
            assert!(
                matches!(err, StegoError::TruncatedHeader),
                "len {len}: {err}"
            );
            assert_eq!(err.category(), ErrorCategory::UnsupportedFormat);
        }
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut bytes = BmpHeaders::for_dimensions(2, 2).unwrap().to_bytes();
        bytes[0..2].copy_from_slice(b"PK");
        let err = read_headers(&mut Cursor::new(&bytes[..])).unwrap_err();
        assert!(matches!(err, StegoError::UnsupportedMagic { found } if found == *b"PK"));
    }

    #[test]
    fn other_variants_are_rejected() {
        let mut headers = BmpHeaders::for_dimensions(2, 2).unwrap();
        headers.info.bit_count = 32;
        let err = read_headers(&mut Cursor::new(&headers.to_bytes()[..])).unwrap_err();
        assert!(matches!(
            err,
            StegoError::UnsupportedVariant {
                header_size: 40,
                bit_count: 32
            }
        ));

        headers.info.bit_count = 24;
        headers.info.header_size = 124;
        let err = read_headers(&mut Cursor::new(&headers.to_bytes()[..])).unwrap_err();
        assert!(matches!(
            err,
            StegoError::UnsupportedVariant {
                header_size: 124,
                ..
            }
        ));
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = BmpFile::open(&dir.path().join("nope.bmp"), Access::ReadOnly).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::FileNotFound);
    }
}
