//! # 命令处理逻辑模块
//!
//! 包含处理 `info`、`reveal` 和 `hide` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心操作以及向用户报告结果。

use crate::cli::{HideArgs, InfoArgs, RevealArgs};
use crate::error::{ErrorCategory, StegoError};
use crate::operations;
use crate::report::HeaderReport;
use anyhow::{Context, Result};
use colored::Colorize;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// 把核心错误折叠成面向用户的一行描述，精确原因保留在错误链中。
///
/// 打开失败时报告实际无法打开的那个路径，其余情况报告 `subject`。
fn describe(err: StegoError, subject: &str) -> anyhow::Error {
    let headline = match err.category() {
        ErrorCategory::FileNotFound => "File not found or cannot be opened",
        ErrorCategory::UnsupportedFormat => "Unsupported file format",
    };
    let subject = match &err {
        StegoError::FileNotFound { path, .. } => display(path),
        _ => subject.to_owned(),
    };
    let message = format!("{headline}: {}", subject.red().bold());
    anyhow::Error::new(err).context(message)
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// 两个路径是否都存在并指向同一个文件。
fn same_file(a: &Path, b: &Path) -> Result<bool> {
    if !a.exists() || !b.exists() {
        return Ok(false);
    }
    Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
}

/// 确定最终被原地修改的文件。
///
/// 未指定输出路径时就是 `source` 本身；否则把 `source` 复制到 `output`，
/// 除非使用 `--force`，否则拒绝覆盖已存在的文件。
fn prepare_target(source: &Path, output: Option<&Path>, force: bool) -> Result<PathBuf> {
    let Some(output) = output else {
        return Ok(source.to_path_buf());
    };

    // 复制到自身会截断文件，直接原地处理
    if same_file(output, source)? {
        return Ok(source.to_path_buf());
    }
    if output.exists() {
        anyhow::ensure!(
            force,
            "Output file already exists: {}. \nUse --force to overwrite it.",
            output.to_string_lossy().red().bold()
        );
        warn!("overwriting existing file {}", output.display());
    }

    fs::copy(source, output).with_context(|| {
        format!(
            "Unable to copy {} to output file: {}",
            source.to_string_lossy().red().bold(),
            output.to_string_lossy().red().bold()
        )
    })?;
    debug!("copied {} to {}", source.display(), output.display());

    Ok(output.to_path_buf())
}

/// 处理 'Info' 命令的执行逻辑。
///
/// 校验文件后打印全部头部字段；校验失败时不输出任何头部内容。
///
/// # Errors
///
/// * 文件无法打开。
/// * 文件不是受支持的 24 位 BMP。
pub fn handle_info(args: InfoArgs) -> Result<()> {
    let headers =
        operations::info(&args.image).map_err(|e| describe(e, &display(&args.image)))?;

    println!(
        "Header report for: {}",
        args.image.to_string_lossy().green().bold()
    );
    print!("{}", HeaderReport::new(&headers));

    Ok(())
}

/// 处理 'Reveal' 命令的执行逻辑。
///
/// 对目标文件的全部像素做半字节交换。指定 `--output` 时先校验输入，
/// 再把它复制到输出路径并在副本上操作，输入文件保持不变。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 文件无法打开，或不是受支持的 24 位 BMP。
/// * 输出文件已存在且未使用 `--force`。
/// * 像素数据不完整，或写入失败 (已处理的行不会回滚)。
pub fn handle_reveal(args: RevealArgs) -> Result<()> {
    if args.output.is_some() {
        operations::info(&args.image).map_err(|e| describe(e, &display(&args.image)))?;
    }
    let target = prepare_target(&args.image, args.output.as_deref(), args.force)?;

    let stats = operations::reveal(&target).map_err(|e| describe(e, &display(&target)))?;

    println!(
        "Revealed {} pixels in {} rows: {}",
        stats.pixels.to_string().green(),
        stats.rows.to_string().green(),
        target.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 把载荷图像的高半字节合并进载体图像的低半字节。两个文件必须都是受支持的 BMP，
/// 并且宽高完全一致；任何校验失败都发生在修改载体之前。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 任一文件无法打开，或不是受支持的 24 位 BMP。
/// * 两个文件的宽或高不同。
/// * 输出路径指向载荷文件 (即使使用 `--force`)。
/// * 输出文件已存在且未使用 `--force`。
/// * 像素数据不完整，或写入失败 (已处理的行不会回滚)。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let subject = format!("{} / {}", display(&args.carrier), display(&args.payload));

    if let Some(output) = args.output.as_deref() {
        operations::check_hide(&args.carrier, &args.payload).map_err(|e| describe(e, &subject))?;
        anyhow::ensure!(
            !same_file(output, &args.payload)?,
            "Output file must not be the payload image: {}. \nThe payload is read-only, even with --force.",
            output.to_string_lossy().red().bold()
        );
    }
    let target = prepare_target(&args.carrier, args.output.as_deref(), args.force)?;

    let stats =
        operations::hide(&target, &args.payload).map_err(|e| describe(e, &subject))?;

    println!(
        "Hid {} in {} ({} pixels): {}",
        args.payload.to_string_lossy().green(),
        args.carrier.to_string_lossy().green(),
        stats.pixels.to_string().green(),
        target.to_string_lossy().green().bold()
    );

    Ok(())
}
