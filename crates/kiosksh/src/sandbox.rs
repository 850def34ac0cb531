//! Sandboxed execution of external commands
//!
//! One [`CommandSandbox`] per shell session. Every call into an OS-level
//! program goes through [`CommandSandbox::execute`]: an already-tokenized
//! argv vector, a scrubbed environment, a working directory confined under
//! the session root, and a hard wall-clock timeout. No shell interpreter is
//! ever involved, so quoting, substitution and redirection characters in
//! arguments reach the child as literal text.

use std::path::{Component, Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{Error, Result};

/// Exit code reported when a command exceeds its deadline.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Resource limits for sandboxed commands.
#[derive(Debug, Clone)]
pub struct ExecLimits {
    /// Hard wall-clock deadline per command.
    /// Default: 10 seconds
    pub timeout: Duration,

    /// Cap on captured bytes per stream (stdout and stderr separately).
    /// Default: 1 MiB
    pub max_output_bytes: usize,
}

impl Default for ExecLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_output_bytes: 1024 * 1024,
        }
    }
}

impl ExecLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-command deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the per-stream capture cap.
    pub fn max_output_bytes(mut self, bytes: usize) -> Self {
        self.max_output_bytes = bytes;
        self
    }
}

/// Captured result of one sandboxed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    fn failed(stderr: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Isolated execution context for external commands.
///
/// Holds the session working directory (mutated only by [`enter_dir`]),
/// the confinement root, and the restricted environment fixed at
/// construction.
///
/// [`enter_dir`]: CommandSandbox::enter_dir
pub struct CommandSandbox {
    root: PathBuf,
    working_dir: PathBuf,
    env: Vec<(String, String)>,
    limits: ExecLimits,
}

impl CommandSandbox {
    /// Create a sandbox rooted at `root`, which must name an existing
    /// directory. The root is canonicalized once so later confinement
    /// checks compare real paths.
    pub fn new(root: impl Into<PathBuf>, limits: ExecLimits) -> Result<Self> {
        let root = std::fs::canonicalize(root.into())?;
        let env = restricted_env(&root);
        Ok(Self {
            working_dir: root.clone(),
            root,
            env,
            limits,
        })
    }

    /// Confinement root, canonicalized.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current session working directory.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn limits(&self) -> &ExecLimits {
        &self.limits
    }

    /// Resolve a user-supplied path against the working directory,
    /// normalizing `.` and `..` components. Purely lexical; the result may
    /// not exist.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        };
        normalize_path(&joined)
    }

    /// Gate a path argument for a non-privileged session: absolute paths
    /// are rejected outright, and relative paths must stay under the root
    /// after `..` normalization. Admin sessions pass through untouched.
    pub fn confine(&self, path: &str, admin: bool) -> Result<PathBuf> {
        let resolved = self.resolve(path);
        if admin {
            return Ok(resolved);
        }
        if Path::new(path).is_absolute() {
            return Err(Error::AbsolutePath);
        }
        if !resolved.starts_with(&self.root) {
            return Err(Error::OutsideRoot(path.to_string()));
        }
        Ok(resolved)
    }

    /// Change the session working directory.
    ///
    /// The target is resolved, canonicalized against the real filesystem,
    /// and required to be an existing directory. Non-admin sessions may
    /// not pass absolute paths and may not land outside the root; the
    /// canonicalized result is checked, so neither `..` chains nor
    /// symlinks escape. On any failure the working directory is unchanged.
    pub async fn enter_dir(&mut self, target: &str, admin: bool) -> Result<&Path> {
        if Path::new(target).is_absolute() && !admin {
            return Err(Error::AbsolutePath);
        }

        let resolved = self.resolve(target);
        let canonical = tokio::fs::canonicalize(&resolved)
            .await
            .map_err(|_| Error::DirNotFound(target.to_string()))?;

        let metadata = tokio::fs::metadata(&canonical)
            .await
            .map_err(|_| Error::DirNotFound(target.to_string()))?;
        if !metadata.is_dir() {
            return Err(Error::NotADirectory(target.to_string()));
        }

        if !admin && !canonical.starts_with(&self.root) {
            return Err(Error::OutsideRoot(target.to_string()));
        }

        self.working_dir = canonical;
        Ok(&self.working_dir)
    }

    /// Run one external command with the default deadline.
    pub async fn run(&self, argv: &[String]) -> ExecOutput {
        self.execute(argv, self.limits.timeout).await
    }

    /// Run one external command.
    ///
    /// `argv[0]` is the program name; the rest are literal arguments. The
    /// child sees the scrubbed environment and the session working
    /// directory, has no stdin, and is killed once `timeout` elapses
    /// (exit code [`TIMEOUT_EXIT_CODE`], timeout message in stderr).
    /// Spawn failures come back as exit code 1 with a descriptive stderr;
    /// this method never returns an error to the caller.
    pub async fn execute(&self, argv: &[String], timeout: Duration) -> ExecOutput {
        let Some((program, args)) = argv.split_first() else {
            return ExecOutput::failed("empty command");
        };

        let mut command = Command::new(program);
        command
            .args(args)
            .env_clear()
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // The output future owns the child; dropping it on timeout kills
        // the process via kill_on_drop.
        match tokio::time::timeout(timeout, command.output()).await {
            Ok(Ok(output)) => ExecOutput {
                exit_code: output.status.code().unwrap_or(-1),
                stdout: self.capture(&output.stdout),
                stderr: self.capture(&output.stderr),
            },
            Ok(Err(e)) => ExecOutput::failed(format!("failed to start {program}: {e}")),
            Err(_elapsed) => ExecOutput {
                exit_code: TIMEOUT_EXIT_CODE,
                stdout: String::new(),
                stderr: format!("command timed out after {}s", timeout.as_secs()),
            },
        }
    }

    /// Decode a captured stream, applying the per-stream byte cap.
    fn capture(&self, bytes: &[u8]) -> String {
        let text = String::from_utf8_lossy(bytes);
        if text.len() <= self.limits.max_output_bytes {
            return text.into_owned();
        }
        format!(
            "{}\n[output truncated, {} bytes total]",
            truncate_utf8(&text, self.limits.max_output_bytes),
            text.len()
        )
    }
}

/// Build the restricted child environment.
///
/// A minimal fixed mapping plus a short allowlist of inherited variables.
/// HOME is pinned to the session root so children cannot discover the real
/// operator home, and `KIOSK_SHELL=1` marks processes spawned from the
/// restricted shell.
fn restricted_env(root: &Path) -> Vec<(String, String)> {
    let mut env = vec![
        (
            "PATH".to_string(),
            "/usr/local/bin:/usr/bin:/bin".to_string(),
        ),
        (
            "LANG".to_string(),
            std::env::var("LANG").unwrap_or_else(|_| "C.UTF-8".to_string()),
        ),
        ("HOME".to_string(), root.to_string_lossy().into_owned()),
        ("TERM".to_string(), "xterm-256color".to_string()),
        ("KIOSK_SHELL".to_string(), "1".to_string()),
    ];

    for var in ["TZ", "DISPLAY", "SHELL"] {
        if let Ok(value) = std::env::var(var) {
            env.push((var.to_string(), value));
        }
    }

    env
}

/// Resolve `.` and `..` components without touching the filesystem.
fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::RootDir => result.push("/"),
            Component::Normal(name) => result.push(name),
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            Component::Prefix(_) => {}
        }
    }

    if result.as_os_str().is_empty() {
        result.push("/");
    }

    result
}

/// Truncate at or before `max_bytes`, respecting char boundaries.
fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
