//! The hook entry point: payload in on stdin, digest out on stdout.
//!
//! Nothing here may block or fail the host's prompt. Every error path logs
//! to stderr and still exits 0.

use std::{
    future::Future,
    io::Write,
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use {
    skillcue_common::hooks::HookInput,
    skillcue_config::SkillcueConfig,
    skillcue_skills::{ActivationPipeline, activation_log},
    tokio::io::{AsyncRead, AsyncReadExt},
    tracing::{debug, error, warn},
};

pub async fn handle_activate(
    config_path: Option<&Path>,
    project_flag: Option<PathBuf>,
    prompt: Option<String>,
) -> ExitCode {
    let config = crate::load_config(config_path).unwrap_or_else(|e| {
        warn!(error = %format!("{e:#}"), "config unusable, using defaults");
        skillcue_config::apply_env_overrides(SkillcueConfig::default())
    });

    let input = match prompt {
        Some(prompt) => HookInput::from_prompt(prompt),
        None => {
            let timeout = Duration::from_millis(config.activation.stdin_timeout_ms);
            read_payload(tokio::io::stdin(), timeout).await
        },
    };

    if let Some(digest) = activate(&config, project_flag, input).await {
        emit(&mut std::io::stdout().lock(), &digest);
    }
    ExitCode::SUCCESS
}

/// Build the pipeline for `input` and run it. `None` means print nothing.
async fn activate(
    config: &SkillcueConfig,
    project_flag: Option<PathBuf>,
    input: HookInput,
) -> Option<String> {
    let home = skillcue_config::home_dir();
    let project = crate::project_dir(project_flag, input.cwd.as_deref());
    debug!(project = %project.display(), "resolved project directory");

    let log = activation_log(config.debug.enabled, &config.log_dir(home.as_deref()));
    let pipeline = ActivationPipeline::from_config(config, &project, home.as_deref(), log);

    contained(async move { pipeline.run(&input).await }).await
}

/// Run `task` on its own tokio task. An error or a panic is logged and
/// yields `None`.
async fn contained<F>(task: F) -> Option<String>
where
    F: Future<Output = skillcue_skills::Result<Option<String>>> + Send + 'static,
{
    match tokio::spawn(task).await {
        Ok(Ok(digest)) => digest,
        Ok(Err(e)) => {
            error!(error = %e, "skill rules unusable, no skills activated");
            None
        },
        Err(e) => {
            error!(error = %e, "skill activation aborted");
            None
        },
    }
}

/// Write the digest. A closed or failing stdout is logged, never fatal.
fn emit(out: &mut impl Write, digest: &str) {
    if let Err(e) = out.write_all(digest.as_bytes()).and_then(|()| out.flush()) {
        warn!(error = %e, "failed to write skill digest");
    }
}

/// Read the hook payload. A missing, slow, or malformed payload yields an
/// empty input.
async fn read_payload<R>(mut reader: R, timeout: Duration) -> HookInput
where
    R: AsyncRead + Unpin,
{
    let mut raw = String::new();
    match tokio::time::timeout(timeout, reader.read_to_string(&mut raw)).await {
        Ok(Ok(_)) => parse_payload(&raw),
        Ok(Err(e)) => {
            warn!(error = %e, "failed to read hook payload");
            HookInput::default()
        },
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "timed out reading hook payload");
            HookInput::default()
        },
    }
}

fn parse_payload(raw: &str) -> HookInput {
    HookInput::parse(raw).unwrap_or_else(|e| {
        warn!(error = %e, "ignoring malformed hook payload");
        HookInput::default()
    })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    /// A config whose only rule file is `rules` and which injects no content.
    fn write_config(dir: &Path, rules: &Path) -> PathBuf {
        let path = dir.join("skillcue.json");
        let config = json!({
            "rules": { "paths": [rules] },
            "content": { "enabled": false },
        });
        std::fs::write(&path, config.to_string()).unwrap();
        path
    }

    #[test]
    fn malformed_payload_degrades_to_empty_input() {
        let input = parse_payload("{not json");
        assert!(input.prompt().is_none());
    }

    #[test]
    fn payload_prompt_and_cwd_are_read() {
        let input = parse_payload(r#"{"prompt":"fix the api","cwd":"/work/app"}"#);
        assert_eq!(input.prompt(), Some("fix the api"));
        assert_eq!(input.cwd.as_deref(), Some(Path::new("/work/app")));
    }

    #[tokio::test]
    async fn reads_payload_from_stdin() {
        let raw: &[u8] = br#"{"prompt":"add a test"}"#;
        let input = read_payload(raw, Duration::from_secs(2)).await;
        assert_eq!(input.prompt(), Some("add a test"));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_stdin_times_out_to_empty_input() {
        // The writer stays open, so the read never reaches EOF.
        let (_writer, reader) = tokio::io::duplex(64);
        let input = read_payload(reader, Duration::from_millis(2000)).await;
        assert!(input.prompt().is_none());
    }

    #[test]
    fn closed_stdout_is_not_fatal() {
        emit(&mut ClosedPipe, "SKILL ACTIVATION\n");

        let mut out = Vec::new();
        emit(&mut out, "SKILL ACTIVATION\n");
        assert_eq!(out, b"SKILL ACTIVATION\n");
    }

    #[tokio::test]
    async fn panics_and_errors_are_contained() {
        let panicked = contained(async {
            if true {
                panic!("matcher blew up");
            }
            Ok(Some("unreachable".to_string()))
        })
        .await;
        assert!(panicked.is_none());

        let failed = contained(async {
            Err(skillcue_skills::Error::RuleParse {
                path: PathBuf::from("skill-rules.json"),
                message: "expected value".into(),
            })
        })
        .await;
        assert!(failed.is_none());

        let ok = contained(async { Ok(Some("digest".to_string())) }).await;
        assert_eq!(ok.as_deref(), Some("digest"));
    }

    #[tokio::test]
    async fn malformed_rules_print_nothing_and_succeed() {
        let tmp = tempfile::tempdir().unwrap();
        let rules = tmp.path().join("skill-rules.json");
        std::fs::write(&rules, r#"{"skills": {"deploy": "#).unwrap();
        let config_path = write_config(tmp.path(), &rules);

        let config = crate::load_config(Some(config_path.as_path())).unwrap();
        let digest = activate(
            &config,
            Some(tmp.path().to_path_buf()),
            HookInput::from_prompt("deploy now"),
        )
        .await;
        assert!(digest.is_none());

        let code = handle_activate(
            Some(config_path.as_path()),
            Some(tmp.path().to_path_buf()),
            Some("deploy now".into()),
        )
        .await;
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn matching_rules_produce_a_digest() {
        let tmp = tempfile::tempdir().unwrap();
        let rules = tmp.path().join("skill-rules.json");
        std::fs::write(
            &rules,
            r#"{"version":"1.0","skills":{"release":{"type":"guardrail","priority":"high",
                "promptTriggers":{"keywords":["deploy"]}}}}"#,
        )
        .unwrap();
        let config_path = write_config(tmp.path(), &rules);

        let config = crate::load_config(Some(config_path.as_path())).unwrap();
        let digest = activate(
            &config,
            Some(tmp.path().to_path_buf()),
            HookInput::from_prompt("deploy now"),
        )
        .await
        .unwrap();
        assert!(digest.contains("  → release [high]"));
    }
}
