mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use videocompress::app::{AppContainer, ConvertRequest, DefaultAppContainer, PreviewRequest};
use videocompress::*;

use common::FakeEngine;

/// Test utilities for the CLI and interactors
mod test_utils {
    use super::*;

    /// Write a placeholder video file of `size` bytes
    pub fn create_test_video(dir: &Path, name: &str, size: usize) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, vec![0u8; size]).unwrap();
        path
    }

    /// CLI isolated from the user's config files and environment
    pub fn cli(workdir: &Path) -> Command {
        let mut cmd = Command::cargo_bin("videocompress").unwrap();
        cmd.current_dir(workdir)
            .env("HOME", workdir)
            .env("XDG_CONFIG_HOME", workdir)
            .env_remove("APPDATA")
            .env_remove("RUST_LOG")
            .env_remove("VIDEOCOMPRESS_FFMPEG")
            .env_remove("VIDEOCOMPRESS_LOG_LEVEL")
            .env_remove("VIDEOCOMPRESS_LOG_FORMAT")
            .env_remove("VIDEOCOMPRESS_WORK_DIR")
            .env_remove("VIDEOCOMPRESS_OUTPUT_DIR")
            .env_remove("VIDEOCOMPRESS_OVERWRITE");
        cmd
    }

    pub fn fake_container() -> (Arc<FakeEngine>, DefaultAppContainer) {
        let engine = Arc::new(FakeEngine::new());
        let container = DefaultAppContainer::with_engine(engine.clone(), EngineCore::default());
        (engine, container)
    }
}

use test_utils::*;

const THREE_MB: usize = 3 * 1024 * 1024;

// CLI Tests

#[test]
fn test_command_prints_default_arguments() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(temp_dir.path(), "clip.mp4", THREE_MB);

    cli(temp_dir.path())
        .args(["command", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("-i input"))
        .stdout(predicate::str::contains("-crf 23 -b:v 0"))
        .stdout(predicate::str::contains("-vf").not())
        .stdout(predicate::str::contains("output.mp4"));
}

#[test]
fn test_command_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(temp_dir.path(), "clip.mp4", 1024);

    let output = cli(temp_dir.path())
        .args(["command", "--json", "--input"])
        .arg(&input)
        .output()
        .unwrap();

    assert!(output.status.success());
    let command: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(command.first().map(String::as_str), Some("-i"));
    assert_eq!(command.last().map(String::as_str), Some("output.mp4"));
}

#[test]
fn test_command_constant_bitrate() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(temp_dir.path(), "clip.mov", 1024);

    cli(temp_dir.path())
        .args(["command", "--rate-control", "cbr", "--bitrate", "1001", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "-b:v 1001k -maxrate 1501.5k -bufsize 2002k",
        ))
        .stdout(predicate::str::contains("-crf").not());
}

#[test]
fn test_command_custom_resolution() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(temp_dir.path(), "clip.mp4", 1024);

    cli(temp_dir.path())
        .args([
            "command",
            "--resolution",
            "custom",
            "--width",
            "1280",
            "--height",
            "720",
            "--input",
        ])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("-vf scale=1280:720"));
}

#[test]
fn test_command_manual_quality_disables_auto() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(temp_dir.path(), "clip.mp4", THREE_MB);

    cli(temp_dir.path())
        .args(["command", "--quality", "35", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("-crf 35"));
}

#[test]
fn test_command_rejects_out_of_range_quality() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(temp_dir.path(), "clip.mp4", 1024);

    cli(temp_dir.path())
        .args(["command", "--quality", "60", "--input"])
        .arg(&input)
        .assert()
        .failure();
}

#[test]
fn test_command_missing_input_fails() {
    let temp_dir = TempDir::new().unwrap();

    cli(temp_dir.path())
        .args(["command", "--input", "nonexistent.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonexistent.mp4"));
}

#[test]
fn test_command_rejects_non_video_input() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(temp_dir.path(), "notes.txt", 1024);

    cli(temp_dir.path())
        .args(["command", "--input"])
        .arg(&input)
        .assert()
        .failure();
}

#[test]
fn test_convert_without_engine_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(temp_dir.path(), "clip.mp4", 1024);

    cli(temp_dir.path())
        .args(["--ffmpeg", "/nonexistent/ffmpeg", "convert", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Conversion failed"));

    assert!(!temp_dir.path().join("clip-compressed.mp4").exists());
}

#[test]
fn test_invalid_config_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(temp_dir.path(), "clip.mp4", 1024);
    let config = temp_dir.path().join("broken.toml");
    std::fs::write(&config, "[log]\nformat = \"xml\"\n").unwrap();

    cli(temp_dir.path())
        .arg("--config")
        .arg(&config)
        .args(["command", "--input"])
        .arg(&input)
        .assert()
        .failure();
}

// Interactor Tests

#[tokio::test]
async fn test_convert_writes_compressed_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(temp_dir.path(), "holiday.mov", THREE_MB);
    let (_engine, container) = fake_container();

    let mut snapshots = Vec::new();
    let response = container
        .convert_interactor()
        .execute(&ConvertRequest::new(&input), |snapshot| {
            snapshots.push(snapshot)
        })
        .await
        .unwrap();

    assert_eq!(
        response.output_path,
        temp_dir.path().join("holiday-compressed.mp4")
    );
    let written = std::fs::read(&response.output_path).unwrap();
    assert_eq!(written.len() as u64, response.report.output_size);
    assert_eq!(
        response.report.settings.rate_control,
        RateControl::ConstantQuality { crf: 23 }
    );
    assert!(snapshots.iter().all(|s| s.percent <= 100));
    assert_eq!(snapshots.last().map(|s| s.percent), Some(100));
}

#[tokio::test]
async fn test_convert_respects_existing_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(temp_dir.path(), "holiday.mov", 1024);
    std::fs::write(temp_dir.path().join("holiday-compressed.mp4"), b"keep").unwrap();
    let (_engine, container) = fake_container();
    let interactor = container.convert_interactor();

    let result = interactor.execute(&ConvertRequest::new(&input), |_| {}).await;
    assert!(result.is_err());
    assert_eq!(
        std::fs::read(temp_dir.path().join("holiday-compressed.mp4")).unwrap(),
        b"keep"
    );

    let mut request = ConvertRequest::new(&input);
    request.overwrite = true;
    interactor.execute(&request, |_| {}).await.unwrap();
    assert_ne!(
        std::fs::read(temp_dir.path().join("holiday-compressed.mp4")).unwrap(),
        b"keep"
    );
}

#[tokio::test]
async fn test_convert_missing_input() {
    let temp_dir = TempDir::new().unwrap();
    let (engine, container) = fake_container();

    let err = container
        .convert_interactor()
        .execute(&ConvertRequest::new(temp_dir.path().join("gone.mp4")), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, VideoCompressError::InputFileNotFound { .. }));
    assert!(engine.exec_calls().is_empty());
}

#[tokio::test]
async fn test_plan_matches_executed_command() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(temp_dir.path(), "holiday.mov", 1024);
    let output_dir = temp_dir.path().join("out");
    std::fs::create_dir(&output_dir).unwrap();
    let (engine, container) = fake_container();

    let mut request = ConvertRequest::new(&input);
    request.resolution = Resolution::Preset {
        preset: ResolutionPreset::P480,
    };
    request.output_dir = Some(output_dir.clone());

    let planned = container.convert_interactor().plan(&request).await.unwrap();
    let response = container
        .convert_interactor()
        .execute(&request, |_| {})
        .await
        .unwrap();

    assert_eq!(engine.exec_calls(), vec![planned.clone()]);
    assert!(planned.contains(&"scale=854:480".to_string()));
    assert_eq!(response.output_path, output_dir.join("holiday-compressed.mp4"));
}

#[tokio::test]
async fn test_preview_writes_preview_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(temp_dir.path(), "holiday.mov", 1024);
    let (engine, container) = fake_container();

    let request = PreviewRequest::new(&input, 30).unwrap();
    let path = container.preview_interactor().execute(&request).await.unwrap();

    assert_eq!(path, temp_dir.path().join("holiday-preview.mp4"));
    assert!(path.exists());
    assert_eq!(
        engine.exec_calls()[0].last().map(String::as_str),
        Some("preview.mp4")
    );
}

#[tokio::test]
async fn test_preview_rejects_invalid_quality() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(temp_dir.path(), "holiday.mov", 1024);
    let (engine, container) = fake_container();

    let request = PreviewRequest::new(&input, 80).unwrap();
    let err = container
        .preview_interactor()
        .execute(&request)
        .await
        .unwrap_err();

    assert!(matches!(err, VideoCompressError::InvalidSettings { .. }));
    assert!(engine.exec_calls().is_empty());
}

#[tokio::test]
async fn test_container_shares_one_session() {
    let (engine, container) = fake_container();
    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(temp_dir.path(), "a.mp4", 1024);

    container
        .convert_interactor()
        .execute(&ConvertRequest::new(&input), |_| {})
        .await
        .unwrap();
    container
        .preview_interactor()
        .execute(&PreviewRequest::new(&input, 28).unwrap())
        .await
        .unwrap();

    assert_eq!(
        engine.load_calls.load(std::sync::atomic::Ordering::SeqCst),
        1
    );
    assert_eq!(container.session().phase(), JobPhase::Done);
}
