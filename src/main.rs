//! # Pixel Perfect — 命令行入口
//!
//! 本文件仅负责日志初始化与参数解析，业务逻辑见 `lib.rs` 架构文档。

use clap::Parser;
use std::process::ExitCode;

use pixel_perfect::cli::{self, CliArgs};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    match cli::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("❌ {}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
