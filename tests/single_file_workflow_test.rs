//! 单文件工作流端到端测试。

mod common;

use common::{http_response, solid_png, spawn_one_shot_server};
use pixel_perfect::config::AppConfig;
use pixel_perfect::processing::{ProcessingClient, ProcessingFlow};
use pixel_perfect::workflow::{SingleFileWorkflow, SourceImage, WorkflowPhase};
use std::time::Duration;

fn client_for(base_url: &str) -> ProcessingClient {
    let config = AppConfig {
        base_url: base_url.to_string(),
        ..AppConfig::default()
    };
    ProcessingClient::new(&config).expect("client init failed")
}

#[tokio::test]
async fn denoise_posts_image_field_and_downloads_result() {
    let result = solid_png(3, 3, [9, 9, 9, 255]);
    let (base_url, requests) = spawn_one_shot_server(http_response("200 OK", "image/png", &result));
    let client = client_for(&base_url);
    let mut workflow = SingleFileWorkflow::new(ProcessingFlow::Denoising);
    workflow
        .upload(Some(SourceImage::new("noisy.png", solid_png(8, 8, [200, 0, 0, 255]), None)))
        .expect("upload failed");

    let phase = workflow.submit(&client).await.expect("submit rejected");

    assert_eq!(phase, WorkflowPhase::Succeeded);
    let request = requests.recv_timeout(Duration::from_secs(5)).expect("no request");
    assert!(request.request_line.starts_with("POST /denoise"));
    assert!(request.body_contains(b"name=\"image\"; filename=\"noisy.png\""));
    assert!(!request.body_contains(b"name=\"mask\""));

    let download = workflow.download_artifact().expect("download unavailable");
    assert_eq!(download.file_name, "denoised_image.png");

    let dir = std::env::temp_dir().join(format!("pixel-perfect-test-{}", std::process::id()));
    let saved = download.save_into(&dir).expect("save failed");
    assert_eq!(std::fs::read(&saved).expect("read back failed"), result);
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn upscale_sends_job_id_field() {
    let (base_url, requests) =
        spawn_one_shot_server(http_response("200 OK", "image/png", &solid_png(2, 2, [0, 0, 0, 255])));
    let client = client_for(&base_url);
    let mut workflow = SingleFileWorkflow::new(ProcessingFlow::SuperResolution);
    workflow
        .upload(Some(SourceImage::new("tiny.png", solid_png(4, 4, [1, 1, 1, 255]), None)))
        .expect("upload failed");

    workflow.submit(&client).await.expect("submit rejected");

    let request = requests.recv_timeout(Duration::from_secs(5)).expect("no request");
    let job_id = workflow.job_id().expect("job id missing").to_string();
    assert!(request.request_line.starts_with("POST /upscale"));
    assert!(request.body_contains(b"name=\"id\""));
    assert!(request.body_contains(job_id.as_bytes()));
    assert!(workflow.hand_off_to_editor().is_ok());
}

#[tokio::test]
async fn mri_failure_keeps_file_for_retry() {
    let (base_url, requests) =
        spawn_one_shot_server(http_response("422 Unprocessable Entity", "text/plain", b""));
    let client = client_for(&base_url);
    let mut workflow = SingleFileWorkflow::new(ProcessingFlow::MriReconstruction);
    workflow
        .upload(Some(SourceImage::new("knee.h5", b"\x89HDF\r\n\x1a\n".to_vec(), None)))
        .expect("upload failed");
    workflow.take_notifications();

    let phase = workflow.submit(&client).await.expect("submit rejected");

    assert_eq!(phase, WorkflowPhase::Failed);
    let request = requests.recv_timeout(Duration::from_secs(5)).expect("no request");
    assert!(request.request_line.starts_with("POST /mri"));
    assert!(request.body_contains(b"name=\"file\"; filename=\"knee.h5\""));
    assert_eq!(workflow.take_notifications()[0].message, "HTTP 422");
    assert!(workflow.source().is_some());
}
