//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// 一款基于半字节隐写的命令行工具，用于查看、隐藏和揭示 24 位未压缩 BMP 图像中的像素信息。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于半字节隐写的命令行工具：把一张 BMP 图像的高 4 位藏进另一张同尺寸 BMP 的低 4 位，\n或交换一张 BMP 每个颜色通道的高低半字节以揭示其中隐藏的图像。仅支持 40 字节信息头的 24 位 BMP。"
)]
pub struct Cli {
    /// 提高日志详细程度 (-v: info, -vv: debug, -vvv: trace)。也可通过 RUST_LOG 设置。
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：info (查看)、reveal (揭示) 和 hide (隐藏)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 打印 BMP 文件头与信息头的全部字段。
    Info(InfoArgs),

    /// 交换每个像素各通道的高低半字节，揭示隐藏的图像 (原地修改)。
    Reveal(RevealArgs),

    /// 把载荷图像的高半字节藏进载体图像的低半字节 (原地修改载体)。
    Hide(HideArgs),
}

/// 'info' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// 要查看的 BMP 文件路径。
    pub image: PathBuf,
}

/// 'reveal' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RevealArgs {
    /// 要处理的 BMP 文件路径。
    pub image: PathBuf,

    /// 将结果写入此路径而不是原地修改输入文件。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 载体图像路径，其低半字节将被替换。
    pub carrier: PathBuf,

    /// 载荷图像路径 (只读)，必须与载体尺寸完全相同。
    pub payload: PathBuf,

    /// 将结果写入此路径而不是原地修改载体文件。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn hide_takes_two_positional_paths() {
        let cli = Cli::try_parse_from(["bmp_nibble", "-v", "hide", "a.bmp", "b.bmp", "-o", "c.bmp"])
            .unwrap();
        assert_eq!(cli.verbose, 1);
        let Commands::Hide(args) = cli.command else {
            panic!("expected hide");
        };
        assert_eq!(args.carrier, PathBuf::from("a.bmp"));
        assert_eq!(args.payload, PathBuf::from("b.bmp"));
        assert_eq!(args.output, Some(PathBuf::from("c.bmp")));
        assert!(!args.force);
    }

    #[test]
    fn missing_arguments_and_unknown_verbs_are_usage_errors() {
        assert!(Cli::try_parse_from(["bmp_nibble", "hide", "a.bmp"]).is_err());
        assert!(Cli::try_parse_from(["bmp_nibble", "info"]).is_err());
        assert!(Cli::try_parse_from(["bmp_nibble", "extract", "a.bmp"]).is_err());
        assert!(Cli::try_parse_from(["bmp_nibble"]).is_err());
    }
}
