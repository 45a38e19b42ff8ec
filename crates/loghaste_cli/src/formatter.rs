use std::fs;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tracing::debug;

/// External formatter run in place on a temporary copy of a buffer,
/// e.g. `prettier --write` or `dprint fmt`.
#[derive(Debug, Clone)]
pub struct Formatter {
    pub cmd: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Formatter {
    /// Writes `text` to a temporary file ending in `.{extension}`, runs the
    /// command with the file path as its last argument and reads the file back.
    /// A non-zero exit or running past the timeout is an error.
    pub fn format(&self, text: &str, extension: &str) -> Result<String> {
        let tmp = tempfile::Builder::new()
            .prefix("loghaste-")
            .suffix(&format!(".{extension}"))
            .tempfile()?;
        fs::write(tmp.path(), text)?;

        let mut child = Command::new(&self.cmd)
            .args(&self.args)
            .arg(tmp.path())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn formatter {}", self.cmd))?;

        // drained while the formatter runs so a chatty one cannot fill the pipe
        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut err = String::new();
                pipe.read_to_string(&mut err).ok();
                err
            })
        });

        // poll until exit or timeout
        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                if !status.success() {
                    let err = stderr.and_then(|h| h.join().ok()).unwrap_or_default();
                    bail!("formatter {} exited with {}: {}", self.cmd, status, err.trim());
                }
                debug!(cmd = %self.cmd, elapsed = ?start.elapsed(), "formatted buffer");
                return fs::read_to_string(tmp.path())
                    .with_context(|| format!("failed to read back {}", tmp.path().display()));
            }
            if start.elapsed() >= self.timeout {
                child.kill().ok();
                child.wait().ok();
                bail!(
                    "formatter {} timed out after {}",
                    self.cmd,
                    humantime::format_duration(self.timeout)
                );
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shell(script: &str, timeout: Duration) -> Formatter {
        // the file path lands in `$0`
        Formatter { cmd: "sh".into(), args: vec!["-c".into(), script.into()], timeout }
    }

    #[test]
    fn result_is_read_back_from_the_file() {
        let f = shell(r#"printf 'formatted();\n' > "$0""#, Duration::from_secs(10));
        assert_eq!(f.format("unformatted( );", "js").unwrap(), "formatted();\n");
    }

    #[test]
    fn temp_file_keeps_the_extension() {
        let f = shell(r#"case "$0" in *.tsx) exit 0;; *) exit 1;; esac"#, Duration::from_secs(10));
        assert_eq!(f.format("a", "tsx").unwrap(), "a");
    }

    #[test]
    fn non_zero_exit_is_an_error() {
        let f = shell("echo broken >&2; exit 3", Duration::from_secs(10));
        let err = f.format("a", "js").unwrap_err().to_string();
        assert!(err.contains("broken"), "{err}");
    }

    #[test]
    fn noisy_stderr_does_not_stall_the_formatter() {
        // well past a pipe buffer
        let f = shell(r#"head -c 200000 /dev/zero | tr '\0' x >&2; printf 'ok' > "$0""#, Duration::from_secs(10));
        assert_eq!(f.format("a", "js").unwrap(), "ok");
    }

    #[test]
    fn slow_formatter_times_out() {
        let f = shell("sleep 5", Duration::from_millis(100));
        let err = f.format("a", "js").unwrap_err().to_string();
        assert!(err.contains("timed out"), "{err}");
    }
}
