//! # bmp_nibble 库
//!
//! 本库包含 BMP 半字节隐写工具的核心逻辑：头部解析与校验、行填充计算，
//! 以及 `info`、`reveal`、`hide` 三种像素操作。

// 声明库包含的所有模块。

pub mod bmp;
pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod header;
pub mod operations;
pub mod report;
pub mod steganography;

pub use error::{ErrorCategory, StegoError};
