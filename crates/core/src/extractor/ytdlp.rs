//! yt-dlp based extractor implementation.

use async_trait::async_trait;
use regex_lite::Regex;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use super::config::ExtractorConfig;
use super::error::ExtractorError;
use super::traits::Extractor;
use super::types::{ExtractionJob, ExtractionResult, TransformKind};

/// Extractor implementation driving the yt-dlp binary.
pub struct YtdlpExtractor {
    config: ExtractorConfig,
}

impl YtdlpExtractor {
    /// Creates a new extractor with the given configuration.
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Creates an extractor with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ExtractorConfig::default())
    }

    /// Builds the post-processing command for a transform kind.
    ///
    /// The tool substitutes `{}` with the path of the downloaded file; the
    /// literal output path is baked into the command tail.
    fn build_post_process_command(&self, kind: TransformKind, output_path: &Path) -> String {
        let ffmpeg = self.config.ffmpeg_path.to_string_lossy();
        let output = output_path.to_string_lossy();

        match kind {
            // Bounded bitrate and resolution so the result stays
            // deliverable over the chat platform. scale=-2:480 keeps the
            // width divisible by 2 as libx264 requires.
            TransformKind::Video => format!(
                "{ffmpeg} -i {{}} -y -vcodec libx264 -crf 23 -vprofile baseline \
                 -b:v 500k -maxrate 500k -bufsize 800k -vf scale=-2:480 -level 3.0 \
                 -threads 0 -pix_fmt yuv420p -codec:a aac -ac 2 -ab 128k \
                 -movflags +faststart {output}"
            ),
            TransformKind::Audio => {
                format!("{ffmpeg} -i {{}} -y -vn -codec:a libmp3lame -ab 128k {output}")
            }
            TransformKind::Clip => {
                format!("{ffmpeg} -i {{}} -y -t 15 -an -vf fps=12,scale=320:-1 {output}")
            }
        }
    }

    /// Builds the yt-dlp argument list for a job.
    fn build_args(&self, job: &ExtractionJob) -> Vec<String> {
        let download_dir = job
            .output_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let mut args = vec![
            "--no-playlist".to_string(),
            "--geo-bypass".to_string(),
            "--newline".to_string(),
            "-f".to_string(),
            self.config.format_selector.clone(),
            "-o".to_string(),
            download_dir.join("%(id)s.%(ext)s").to_string_lossy().to_string(),
        ];

        if !job.proxy.is_empty() {
            args.extend(["--proxy".to_string(), job.proxy.clone()]);
        }

        args.extend(self.config.extra_args.iter().cloned());

        args.extend([
            "--exec".to_string(),
            self.build_post_process_command(job.kind, &job.output_path),
        ]);

        args.push(job.url.clone());

        args
    }

    /// Runs one extraction pass to completion.
    async fn run_extraction(&self, job: &ExtractionJob) -> Result<ExtractionResult, ExtractorError> {
        let start = Instant::now();
        let args = self.build_args(job);

        debug!("Running {:?} {:?}", self.config.ytdlp_path, args);

        let mut child = Command::new(&self.config.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExtractorError::ToolNotFound {
                        path: self.config.ytdlp_path.clone(),
                    }
                } else {
                    ExtractorError::Io(e)
                }
            })?;

        let stdout = child.stdout.take().expect("stdout should be captured");
        let stderr = child.stderr.take().expect("stderr should be captured");

        let progress_regex = Regex::new(r"\[download\]\s+(\d+\.?\d*)%").ok();
        let url = job.url.clone();

        let stdout_task = async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(ref re) = progress_regex {
                    if let Some(caps) = re.captures(&line) {
                        if let Some(pct) = caps.get(1) {
                            debug!("Download progress for {}: {}%", url, pct.as_str());
                            continue;
                        }
                    }
                }
                debug!("yt-dlp: {}", line);
            }
        };

        let stderr_task = async move {
            let mut error_output = String::new();
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("yt-dlp stderr: {}", line);
                if line.starts_with("ERROR") || line.contains("error") {
                    error_output.push_str(&line);
                    error_output.push('\n');
                }
            }
            error_output
        };

        let wait_all = async {
            let ((), error_output) = tokio::join!(stdout_task, stderr_task);
            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, error_output))
        };

        // Only enforced when configured; the default contract is to wait as
        // long as the tool runs.
        let result = match self.config.timeout_secs {
            Some(secs) => match timeout(Duration::from_secs(secs), wait_all).await {
                Ok(inner) => inner,
                Err(_) => {
                    // Kill the process on timeout
                    let _ = child.kill().await;
                    return Err(ExtractorError::Timeout { timeout_secs: secs });
                }
            },
            None => wait_all.await,
        };

        let (status, error_output) = result.map_err(ExtractorError::Io)?;

        if !status.success() {
            return Err(ExtractorError::extraction_failed(
                format!("yt-dlp exited with code: {:?}", status.code()),
                if error_output.is_empty() {
                    None
                } else {
                    Some(error_output)
                },
            ));
        }

        // The post-processing command is the step that writes the output,
        // so a zero exit status alone does not prove the artifact exists.
        let output_meta = tokio::fs::metadata(&job.output_path).await.map_err(|_| {
            ExtractorError::OutputMissing {
                path: job.output_path.clone(),
            }
        })?;

        info!(
            "Extracted {} to {:?} ({} bytes)",
            job.url,
            job.output_path,
            output_meta.len()
        );

        Ok(ExtractionResult {
            output_path: job.output_path.clone(),
            output_size_bytes: output_meta.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[async_trait]
impl Extractor for YtdlpExtractor {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch(&self, job: ExtractionJob) -> Result<ExtractionResult, ExtractorError> {
        self.run_extraction(&job).await
    }

    async fn validate(&self) -> Result<(), ExtractorError> {
        let ytdlp_result = Command::new(&self.config.ytdlp_path)
            .arg("--version")
            .output()
            .await;

        if let Err(e) = ytdlp_result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(ExtractorError::ToolNotFound {
                    path: self.config.ytdlp_path.clone(),
                });
            }
            return Err(ExtractorError::Io(e));
        }

        let ffmpeg_result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await;

        if let Err(e) = ffmpeg_result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(ExtractorError::ToolNotFound {
                    path: self.config.ffmpeg_path.clone(),
                });
            }
            return Err(ExtractorError::Io(e));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn job(kind: TransformKind, proxy: &str) -> ExtractionJob {
        ExtractionJob {
            url: "https://example.test/v1".to_string(),
            output_path: PathBuf::from("/tmp/tgbot_NDI_abc.mp4"),
            kind,
            proxy: proxy.to_string(),
        }
    }

    #[test]
    fn test_build_args_without_proxy() {
        let extractor = YtdlpExtractor::with_defaults();
        let args = extractor.build_args(&job(TransformKind::Video, ""));

        assert!(!args.contains(&"--proxy".to_string()));
        assert!(args.contains(&"-f".to_string()));
        assert!(args.contains(&"bestvideo+bestaudio/best".to_string()));
        assert_eq!(args.last(), Some(&"https://example.test/v1".to_string()));
    }

    #[test]
    fn test_build_args_with_proxy() {
        let extractor = YtdlpExtractor::with_defaults();
        let args = extractor.build_args(&job(TransformKind::Video, "10.0.0.1:3128"));

        let idx = args.iter().position(|a| a == "--proxy").unwrap();
        assert_eq!(args[idx + 1], "10.0.0.1:3128");
    }

    #[test]
    fn test_video_post_process_command() {
        let extractor = YtdlpExtractor::with_defaults();
        let cmd = extractor
            .build_post_process_command(TransformKind::Video, Path::new("/tmp/out.mp4"));

        assert!(cmd.contains("libx264"));
        assert!(cmd.contains("scale=-2:480"));
        assert!(cmd.contains("-maxrate 500k"));
        assert!(cmd.contains("+faststart"));
        assert!(cmd.ends_with("/tmp/out.mp4"));
    }

    #[test]
    fn test_audio_post_process_command() {
        let extractor = YtdlpExtractor::with_defaults();
        let cmd = extractor
            .build_post_process_command(TransformKind::Audio, Path::new("/tmp/out.mp3"));

        assert!(cmd.contains("-vn"));
        assert!(cmd.contains("libmp3lame"));
        assert!(cmd.ends_with("/tmp/out.mp3"));
    }

    #[test]
    fn test_clip_post_process_command_is_silent() {
        let extractor = YtdlpExtractor::with_defaults();
        let cmd = extractor
            .build_post_process_command(TransformKind::Clip, Path::new("/tmp/out.gif"));

        assert!(cmd.contains("-an"));
        assert!(cmd.contains("fps=12"));
        assert!(cmd.ends_with("/tmp/out.gif"));
    }

    #[test]
    fn test_custom_ffmpeg_path_in_command() {
        let config = ExtractorConfig::with_paths(
            PathBuf::from("yt-dlp"),
            PathBuf::from("/opt/ffmpeg/bin/ffmpeg"),
        );
        let extractor = YtdlpExtractor::new(config);
        let cmd = extractor
            .build_post_process_command(TransformKind::Video, Path::new("/tmp/out.mp4"));

        assert!(cmd.starts_with("/opt/ffmpeg/bin/ffmpeg "));
    }

    #[test]
    fn test_extra_args_are_forwarded() {
        let config = ExtractorConfig {
            extra_args: vec!["--verbose".to_string()],
            ..Default::default()
        };
        let extractor = YtdlpExtractor::new(config);
        let args = extractor.build_args(&job(TransformKind::Video, ""));

        assert!(args.contains(&"--verbose".to_string()));
    }
}
