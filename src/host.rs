//! The environment effects land in: browser tabs, the clipboard, the
//! settings surface and transient on-page feedback.

use async_trait::async_trait;
use colored::Colorize;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Mutex;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::debug;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("failed to open {url}: {reason}")]
    Open { url: String, reason: String },
    #[error("clipboard write failed: {0}")]
    Clipboard(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Visual state of the control that triggered a clipboard write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Idle,
    Copied,
    CopyFailed,
}

/// Effect sink for the dispatcher.
#[async_trait]
pub trait Host: Send + Sync {
    async fn open_tab(&self, url: &str) -> Result<(), HostError>;

    async fn write_clipboard(&self, text: &str) -> Result<(), HostError>;

    async fn open_settings(&self) -> Result<(), HostError>;

    fn show_feedback(&self, feedback: Feedback);
}

/// Opener commands, tried in order.
#[cfg(target_os = "macos")]
const OPENERS: &[(&str, &[&str])] = &[("open", &[])];
#[cfg(target_os = "windows")]
const OPENERS: &[(&str, &[&str])] = &[("cmd", &["/C", "start", ""])];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const OPENERS: &[(&str, &[&str])] = &[("xdg-open", &[]), ("gio", &["open"])];

/// Clipboard writers reading from stdin, tried in order.
const CLIPBOARD_WRITERS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
    ("clip", &[]),
];

/// Host backed by the desktop: system opener and clipboard tools.
#[derive(Debug, Clone)]
pub struct SystemHost {
    settings_path: PathBuf,
}

impl SystemHost {
    pub fn new(settings_path: PathBuf) -> Self {
        Self { settings_path }
    }
}

#[async_trait]
impl Host for SystemHost {
    async fn open_tab(&self, url: &str) -> Result<(), HostError> {
        for (program, args) in OPENERS {
            match Command::new(program).args(*args).arg(url).spawn() {
                Ok(_) => {
                    debug!(program, url, "opened");
                    return Ok(());
                }
                Err(e) => debug!(program, error = %e, "opener unavailable"),
            }
        }
        Err(HostError::Open {
            url: url.to_string(),
            reason: "no system opener found".to_string(),
        })
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), HostError> {
        write_with(CLIPBOARD_WRITERS, text).await
    }

    async fn open_settings(&self) -> Result<(), HostError> {
        eprintln!(
            "Settings are stored in {}. Use `context-bridge settings` to change them.",
            self.settings_path.display()
        );
        Ok(())
    }

    fn show_feedback(&self, feedback: Feedback) {
        match feedback {
            Feedback::Copied => eprintln!("{}", "Copied!".green()),
            Feedback::CopyFailed => eprintln!("{}", "Copy Failed".red()),
            Feedback::Idle => {}
        }
    }
}

/// Pipe `text` into the first writer that accepts it. A tool that is missing,
/// rejects the input or exits non-zero hands over to the next one.
async fn write_with(writers: &[(&str, &[&str])], text: &str) -> Result<(), HostError> {
    let mut last_error = HostError::Clipboard("no clipboard tool found".to_string());
    for (program, args) in writers {
        let child = Command::new(program)
            .args(*args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                debug!(program, error = %e, "clipboard tool unavailable");
                continue;
            }
        };
        match feed(&mut child, program, text).await {
            Ok(()) => {
                debug!(program, bytes = text.len(), "clipboard written");
                return Ok(());
            }
            Err(e) => {
                debug!(program, error = %e, "clipboard tool failed");
                last_error = e;
            }
        }
    }
    Err(last_error)
}

async fn feed(child: &mut Child, program: &str, text: &str) -> Result<(), HostError> {
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).await?;
    }
    let status = child.wait().await?;
    if status.success() {
        Ok(())
    } else {
        Err(HostError::Clipboard(format!("{program} exited with {status}")))
    }
}

/// A call made on a [`DryRunHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    OpenTab(String),
    WriteClipboard(String),
    OpenSettings,
}

/// Host that only records and prints what it would do.
#[derive(Debug, Default)]
pub struct DryRunHost {
    calls: Mutex<Vec<HostCall>>,
    quiet: bool,
}

impl DryRunHost {
    /// A dry-run host that prints each call to stdout.
    pub fn verbose() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            quiet: false,
        }
    }

    /// A dry-run host that records silently.
    pub fn silent() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            quiet: true,
        }
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: HostCall) {
        if !self.quiet {
            match &call {
                HostCall::OpenTab(url) => println!("{} {}", "open tab:".cyan(), url),
                HostCall::WriteClipboard(text) => {
                    println!("{}\n{}", "clipboard:".cyan(), text)
                }
                HostCall::OpenSettings => println!("{}", "open settings".cyan()),
            }
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl Host for DryRunHost {
    async fn open_tab(&self, url: &str) -> Result<(), HostError> {
        self.record(HostCall::OpenTab(url.to_string()));
        Ok(())
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), HostError> {
        self.record(HostCall::WriteClipboard(text.to_string()));
        Ok(())
    }

    async fn open_settings(&self) -> Result<(), HostError> {
        self.record(HostCall::OpenSettings);
        Ok(())
    }

    fn show_feedback(&self, _feedback: Feedback) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dry_run_records_in_order() {
        let host = DryRunHost::silent();
        host.write_clipboard("abc").await.unwrap();
        host.open_tab("https://claude.ai/new").await.unwrap();
        assert_eq!(
            host.calls(),
            vec![
                HostCall::WriteClipboard("abc".into()),
                HostCall::OpenTab("https://claude.ai/new".into()),
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_clipboard_tool_hands_over_to_next() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("clipboard.txt");
        let script = format!("cat > '{}'", target.display());
        let sh_args = ["-c", script.as_str()];
        let writers: [(&str, &[&str]); 3] = [
            ("context-bridge-missing-tool", &[]),
            ("false", &[]),
            ("sh", &sh_args),
        ];

        write_with(&writers, "pasted text").await.unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "pasted text");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn last_failure_reported_when_every_tool_fails() {
        let writers: [(&str, &[&str]); 2] = [("false", &[]), ("context-bridge-missing-tool", &[])];
        let err = write_with(&writers, "text").await.unwrap_err();
        assert!(
            matches!(&err, HostError::Clipboard(reason) if reason.starts_with("false exited"))
                || matches!(err, HostError::Io(_)),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn no_tools_means_not_found() {
        let err = write_with(&[], "text").await.unwrap_err();
        assert_eq!(err.to_string(), "clipboard write failed: no clipboard tool found");
    }

    #[test]
    fn clipboard_error_message() {
        let err = HostError::Clipboard("no clipboard tool found".into());
        assert_eq!(err.to_string(), "clipboard write failed: no clipboard tool found");
    }
}
