use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

use bmp_nibble::{
    cli::{Cli, Commands},
    handler::{handle_hide, handle_info, handle_reveal},
};

/// 初始化日志系统，格式为 `[LEVEL] message`，输出到标准错误。
///
/// 默认只输出警告；`-v` 逐级提高，`RUST_LOG` 优先于命令行设置。
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    Builder::new()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// 程序的主入口点
///
/// 负责解析命令行参数，并根据指定的子命令（`info`、`reveal` 或 `hide`）
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();
    init_logger(cli.verbose);

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Info(args) => handle_info(args),
        Commands::Reveal(args) => handle_reveal(args),
        Commands::Hide(args) => handle_hide(args),
    }
}
