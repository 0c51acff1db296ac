//! # 错误类型模块
//!
//! 核心库使用 [`StegoError`] 精确地区分每一种失败原因；
//! 面向用户时，通过 [`StegoError::category`] 将它们折叠为两个粗粒度类别。

use std::io;
use std::path::PathBuf;

/// 面向调用者的粗粒度错误类别。
///
/// 所有结构性问题 (魔数错误、头部截断、不支持的变体、尺寸不一致、像素数据截断)
/// 对外都表现为同一种 "不支持的格式"。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    FileNotFound,
    UnsupportedFormat,
}

/// BMP 读取、校验与像素变换过程中可能出现的错误。
#[derive(Debug, thiserror::Error)]
pub enum StegoError {
    #[error("cannot open {}: {source}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file is shorter than the 54-byte BMP headers")]
    TruncatedHeader,

    #[error("unrecognized magic bytes {found:02X?}, expected \"BM\"")]
    UnsupportedMagic { found: [u8; 2] },

    #[error("unsupported variant: {header_size}-byte info header with {bit_count} bits per pixel")]
    UnsupportedVariant { header_size: u32, bit_count: u16 },

    #[error(
        "dimension mismatch: carrier is {}x{}, payload is {}x{}",
        .carrier.0, .carrier.1, .payload.0, .payload.1
    )]
    DimensionMismatch {
        carrier: (i32, i32),
        payload: (i32, i32),
    },

    #[error("pixel data ends before row {row} is complete")]
    TruncatedPixelData { row: u32 },

    #[error("I/O error while walking pixel data: {0}")]
    Io(#[from] io::Error),
}

impl StegoError {
    /// 将具体的错误原因折叠为对外报告的类别。
    pub fn category(&self) -> ErrorCategory {
        match self {
            StegoError::FileNotFound { .. } => ErrorCategory::FileNotFound,
            _ => ErrorCategory::UnsupportedFormat,
        }
    }
}
