//! # 头部报告模块
//!
//! 把一个 BMP 的全部头部字段格式化为固定的、逐行 `名称: 值` 的文本，
//! 并附带由头部推导出的行布局信息。

use crate::bmp::RowLayout;
use crate::header::BmpHeaders;
use std::fmt;

/// `info` 命令输出的头部报告。
#[derive(Debug, Clone, Copy)]
pub struct HeaderReport<'a> {
    headers: &'a BmpHeaders,
}

impl<'a> HeaderReport<'a> {
    pub fn new(headers: &'a BmpHeaders) -> Self {
        Self { headers }
    }
}

impl fmt::Display for HeaderReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = RowLayout::of(&self.headers.info);
        let orientation = if self.headers.info.is_top_down() {
            "top-down"
        } else {
            "bottom-up"
        };

        writeln!(f, "[File header]")?;
        write!(f, "{}", self.headers.file)?;
        writeln!(f, "[Info header]")?;
        write!(f, "{}", self.headers.info)?;
        writeln!(f, "[Pixel array]")?;
        writeln!(f, "Rows: {}", layout.rows)?;
        writeln!(f, "RowPadding: {}", layout.padding)?;
        writeln!(f, "RowStride: {}", layout.stride())?;
        writeln!(f, "Orientation: {orientation}")
    }
}
