//! # 命令行入口
//!
//! 无界面模式：把工作流的事件序列交给命令行参数驱动，结果按固定文件名写入输出目录。
//!
//! ```text
//! pixel-perfect inpaint --image photo.png --strokes strokes.json --out results/
//! pixel-perfect process --flow denoise --file noisy.png
//! pixel-perfect process --flow mri --file knee.h5 --out results/
//! pixel-perfect poll --flow upscale --job-id img_1700000000000_1
//! ```
//!
//! 笔画文件是折线列表，坐标为画布像素坐标：`[[[x, y], [x, y], ...], ...]`。

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::notification::{Notification, NotificationKind};
use crate::processing::{DownloadableFile, ProcessingClient, ProcessingFlow, StatusPoller};
use crate::workflow::{
    MaskEditWorkflow, RequestState, SingleFileWorkflow, SourceImage, WorkflowError,
};

/// Pixel Perfect 命令行客户端。
#[derive(Parser, Debug)]
#[command(
    name = "pixel-perfect",
    about = "Submit images to the Pixel Perfect processing service without a GUI"
)]
pub struct CliArgs {
    /// JSON 配置文件路径。
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 在源图上回放笔画生成遮罩，并提交局部重绘。
    Inpaint {
        #[arg(long, value_name = "IMAGE")]
        image: PathBuf,

        /// 笔画 JSON 文件。
        #[arg(long, value_name = "STROKES.json")]
        strokes: PathBuf,

        /// 笔刷宽度（1-50）。缺省使用配置值。
        #[arg(long, value_name = "1-50")]
        stroke_width: Option<i64>,

        #[arg(long, default_value = ".", value_name = "DIR")]
        out: PathBuf,
    },

    /// 整体提交单个文件：denoise / upscale / mri。
    Process {
        #[arg(long, value_parser = parse_flow)]
        flow: ProcessingFlow,

        #[arg(long, value_name = "FILE")]
        file: PathBuf,

        #[arg(long, default_value = ".", value_name = "DIR")]
        out: PathBuf,
    },

    /// 轮询已受理任务的状态并拉取结果。
    Poll {
        #[arg(long, value_parser = parse_flow)]
        flow: ProcessingFlow,

        #[arg(long, value_name = "ID")]
        job_id: String,

        #[arg(long, default_value = ".", value_name = "DIR")]
        out: PathBuf,
    },
}

fn parse_flow(value: &str) -> Result<ProcessingFlow, String> {
    ProcessingFlow::parse(value).map_err(String::from)
}

/// 一条折线（画布像素坐标）。
pub type StrokePath = Vec<[f32; 2]>;

/// 解析笔画 JSON。
pub fn parse_strokes(content: &str) -> Result<Vec<StrokePath>, AppError> {
    serde_json::from_str::<Vec<StrokePath>>(content)
        .map_err(|e| AppError::Config(format!("解析笔画文件失败: {}", e)))
}

/// 把折线逐条回放为按下 → 移动 → 抬起。
pub fn replay_strokes(workflow: &mut MaskEditWorkflow, strokes: &[StrokePath]) -> Result<(), AppError> {
    for path in strokes {
        let Some((first, rest)) = path.split_first() else {
            continue;
        };
        workflow.pointer_down(first[0], first[1])?;
        for point in rest {
            workflow.pointer_move(point[0], point[1]);
        }
        workflow.pointer_up();
    }
    Ok(())
}

/// 执行一条命令。
pub async fn run(args: CliArgs) -> Result<(), AppError> {
    let config = AppConfig::load(args.config.as_deref())?;
    let client = ProcessingClient::new(&config)?;
    log::info!("⚙️ 处理服务地址: {}", client.base_url());

    match args.command {
        Command::Inpaint {
            image,
            strokes,
            stroke_width,
            out,
        } => run_inpaint(&config, &client, &image, &strokes, stroke_width, &out).await,
        Command::Process { flow, file, out } => run_process(&client, flow, &file, &out).await,
        Command::Poll { flow, job_id, out } => {
            let poller = StatusPoller::from_config(&config);
            let artifact = poller.poll(&client, flow, &job_id).await.into_result()?;
            let path = DownloadableFile {
                file_name: flow.download_file_name(),
                artifact,
            }
            .save_into(&out)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

async fn run_inpaint(
    config: &AppConfig,
    client: &ProcessingClient,
    image: &Path,
    strokes: &Path,
    stroke_width: Option<i64>,
    out: &Path,
) -> Result<(), AppError> {
    let strokes = parse_strokes(&std::fs::read_to_string(strokes)?)?;
    let mut workflow = MaskEditWorkflow::new(config);

    let uploaded = workflow.upload(Some(SourceImage::from_path(image)?)).await;
    print_notifications(workflow.take_notifications());
    uploaded?;

    if let Some(width) = stroke_width {
        workflow.set_stroke_width(width);
    }
    replay_strokes(&mut workflow, &strokes)?;

    let phase = workflow.submit(client).await;
    print_notifications(workflow.take_notifications());
    phase?;
    finish(workflow.request_state(), workflow.download_artifact(), out).map(|_| ())
}

async fn run_process(
    client: &ProcessingClient,
    flow: ProcessingFlow,
    file: &Path,
    out: &Path,
) -> Result<(), AppError> {
    let mut workflow = SingleFileWorkflow::new(flow);

    let uploaded = workflow.upload(Some(SourceImage::from_path(file)?));
    print_notifications(workflow.take_notifications());
    uploaded?;

    let phase = workflow.submit(client).await;
    print_notifications(workflow.take_notifications());
    if let Some(job_id) = workflow.job_id() {
        log::info!("🆔 任务 ID: {}", job_id);
    }
    phase?;
    finish(workflow.request_state(), workflow.download_artifact(), out).map(|_| ())
}

/// 根据最终请求状态保存结果或返回失败原因。
fn finish(
    state: &RequestState,
    download: Result<DownloadableFile, WorkflowError>,
    out: &Path,
) -> Result<PathBuf, AppError> {
    match state {
        RequestState::Succeeded { .. } => {
            let path = download?.save_into(out)?;
            println!("{}", path.display());
            Ok(path)
        }
        RequestState::Failed { message, .. } => Err(AppError::Failed(message.clone())),
        RequestState::Idle | RequestState::Submitting { .. } => {
            Err(AppError::Failed(crate::processing::GENERIC_FAILURE_MESSAGE.to_string()))
        }
    }
}

fn print_notifications(notifications: Vec<Notification>) {
    for note in notifications {
        match note.kind {
            NotificationKind::Error => eprintln!("✖ {}", note.message),
            NotificationKind::Success => println!("✔ {}", note.message),
            NotificationKind::Info => println!("• {}", note.message),
        }
    }
}
