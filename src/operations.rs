//! # 文件级操作模块
//!
//! `info`、`reveal`、`hide` 三个操作的路径级入口。
//! 每个操作在开始时打开所需文件，文件句柄在任何返回路径上都会被关闭。

use crate::bmp::{Access, BmpFile};
use crate::error::StegoError;
use crate::header::BmpHeaders;
use crate::steganography::{WalkStats, check_dimensions, hide_pixels, reveal_pixels};
use log::info;
use std::path::Path;

/// 只读地打开并校验 `path`，返回其头部。不读取任何像素数据。
pub fn info(path: &Path) -> Result<BmpHeaders, StegoError> {
    Ok(BmpFile::open(path, Access::ReadOnly)?.headers)
}

/// 对 `path` 的全部像素原地做半字节交换。
pub fn reveal(path: &Path) -> Result<WalkStats, StegoError> {
    let mut bmp = BmpFile::open(path, Access::ReadWrite)?;
    let stats = reveal_pixels(&mut bmp.file, &bmp.headers)?;
    info!(
        "revealed {}: {} pixels in {} rows",
        path.display(),
        stats.pixels,
        stats.rows
    );
    Ok(stats)
}

/// 只读地校验载体与载荷，并确认二者尺寸一致，不修改任何文件。
pub fn check_hide(carrier: &Path, payload: &Path) -> Result<(BmpHeaders, BmpHeaders), StegoError> {
    let carrier = info(carrier)?;
    let payload = info(payload)?;
    check_dimensions(&carrier, &payload)?;
    Ok((carrier, payload))
}

/// 将 `payload` 的高半字节合并进 `carrier` 的低半字节，原地修改 `carrier`。
///
/// 两个文件各自独立校验；尺寸不一致时在修改任何字节之前失败。
pub fn hide(carrier: &Path, payload: &Path) -> Result<WalkStats, StegoError> {
    let mut carrier_bmp = BmpFile::open(carrier, Access::ReadWrite)?;
    let mut payload_bmp = BmpFile::open(payload, Access::ReadOnly)?;

    let stats = hide_pixels(
        &mut carrier_bmp.file,
        &carrier_bmp.headers,
        &mut payload_bmp.file,
        &payload_bmp.headers,
    )?;
    info!(
        "hid {} in {}: {} pixels in {} rows",
        payload.display(),
        carrier.display(),
        stats.pixels,
        stats.rows
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use std::fs;

    fn write_bmp(path: &Path, width: i32, height: i32, value: u8) {
        let headers = BmpHeaders::for_dimensions(width, height).unwrap();
        let mut bytes = headers.to_bytes().to_vec();
        bytes.resize(headers.file.size as usize, value);
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn reveal_round_trips_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bmp");
        write_bmp(&path, 4, 2, 0x3C);
        let before = fs::read(&path).unwrap();

        reveal(&path).unwrap();
        let once = fs::read(&path).unwrap();
        assert_eq!(once[..54], before[..54]);
        assert!(once[54..].iter().all(|&b| b == 0xC3));

        reveal(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn every_operation_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.bmp");
        let present = dir.path().join("present.bmp");
        write_bmp(&present, 2, 2, 0);

        assert_eq!(info(&missing).unwrap_err().category(), ErrorCategory::FileNotFound);
        assert_eq!(reveal(&missing).unwrap_err().category(), ErrorCategory::FileNotFound);
        assert_eq!(
            hide(&missing, &present).unwrap_err().category(),
            ErrorCategory::FileNotFound
        );
        assert_eq!(
            hide(&present, &missing).unwrap_err().category(),
            ErrorCategory::FileNotFound
        );
    }

    #[test]
    fn hide_checks_payload_before_touching_carrier() {
        let dir = tempfile::tempdir().unwrap();
        let carrier = dir.path().join("carrier.bmp");
        let payload = dir.path().join("payload.txt");
        write_bmp(&carrier, 2, 2, 0xAA);
        fs::write(&payload, b"definitely not a bitmap, but long enough for both headers!").unwrap();
        let before = fs::read(&carrier).unwrap();

        let err = hide(&carrier, &payload).unwrap_err();
        assert!(matches!(err, StegoError::UnsupportedMagic { .. }));
        assert_eq!(fs::read(&carrier).unwrap(), before);

        let err = check_hide(&carrier, &payload).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::UnsupportedFormat);
    }
}
