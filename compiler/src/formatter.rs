//! Optional external formatter (`dartfmt`) that generated source is piped
//! through before it reaches its output.

use crate::error::{FidlgenError, Result};
use std::{
    io::{self, Read, Write},
    path::PathBuf,
    process::{Child, Command, ExitStatus, Stdio},
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

/// How long a formatter may run per file before it is killed.
pub const FORMATTER_TIMEOUT: Duration = Duration::from_secs(2 * 60);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct Formatter {
    path:    Option<PathBuf>,
    timeout: Duration,
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter::new(None)
    }
}

impl Formatter {
    pub fn new(path: Option<PathBuf>) -> Self {
        Formatter {
            path,
            timeout: FORMATTER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Starts the formatter, if any, and returns a writer that feeds it.
    /// Formatted output reaches `out` only once [`FormatPipe::close`]
    /// succeeds. Without a formatter, writes go straight to `out`.
    pub fn pipe<W: Write>(&self, out: W) -> Result<FormatPipe<W>> {
        let running = match &self.path {
            Some(path) => Some(Running::spawn(path.clone(), self.timeout)?),
            None => None,
        };
        Ok(FormatPipe { out, running })
    }
}

pub struct FormatPipe<W: Write> {
    out:     W,
    running: Option<Running>,
}

impl<W: Write> Write for FormatPipe<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.running {
            None => self.out.write(buf),
            Some(running) => {
                running.send(buf.to_vec());
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.running {
            None => self.out.flush(),
            Some(_) => Ok(()),
        }
    }
}

impl<W: Write> FormatPipe<W> {
    /// Ends the input, waits for the formatter and copies its output to the
    /// underlying writer, which is handed back.
    pub fn close(self) -> Result<W> {
        let FormatPipe { mut out, running } = self;
        if let Some(running) = running {
            let formatted = running.finish()?;
            out.write_all(&formatted)?;
        }
        out.flush()?;
        Ok(out)
    }
}

/// A spawned formatter process. Dropping it before `finish` kills the child.
///
/// Each I/O thread reports through a channel so its result can be awaited
/// against the deadline. Threads still blocked when it passes are detached.
struct Running {
    path:     PathBuf,
    timeout:  Duration,
    deadline: Instant,
    child:    Child,
    reaped:   bool,
    input:    Option<mpsc::Sender<Vec<u8>>>,
    fed:      Receiver<io::Result<()>>,
    stdout:   Receiver<io::Result<Vec<u8>>>,
    stderr:   Receiver<io::Result<Vec<u8>>>,
}

impl Running {
    fn spawn(path: PathBuf, timeout: Duration) -> Result<Self> {
        tracing::debug!(formatter = %path.display(), "starting formatter");
        let mut child = Command::new(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FidlgenError::FormatterSpawn {
                path: path.display().to_string(),
                source,
            })?;
        let deadline = Instant::now() + timeout;

        let (mut stdin, stdout, stderr) = match (child.stdin.take(), child.stdout.take(), child.stderr.take()) {
            (Some(stdin), Some(stdout), Some(stderr)) => (stdin, stdout, stderr),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "formatter pipes unavailable").into());
            }
        };

        let (input, chunks) = mpsc::channel::<Vec<u8>>();
        let fed = spawn_io(move || {
            for chunk in chunks {
                stdin.write_all(&chunk)?;
            }
            stdin.flush()
        });
        let stdout = spawn_io(move || read_all(stdout));
        let stderr = spawn_io(move || read_all(stderr));

        Ok(Running {
            path,
            timeout,
            deadline,
            child,
            reaped: false,
            input: Some(input),
            fed,
            stdout,
            stderr,
        })
    }

    /// A closed channel means the stdin thread already stopped; `finish`
    /// reports the exit status or the write error instead.
    fn send(&self, chunk: Vec<u8>) {
        if let Some(input) = &self.input {
            let _ = input.send(chunk);
        }
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        // Dropping the sender ends the stdin thread, which closes the pipe.
        self.input.take();
        let status = self.wait()?;

        // A process the formatter left behind can hold its pipes open past
        // its own exit, so the output is bounded by the same deadline.
        let fed = match recv_before(&self.fed, self.deadline) {
            Some(fed) => fed,
            None => return Err(self.timed_out()),
        };
        let stdout = match recv_before(&self.stdout, self.deadline) {
            Some(read) => read?,
            None => return Err(self.timed_out()),
        };
        let stderr = match recv_before(&self.stderr, self.deadline) {
            Some(read) => read?,
            None => return Err(self.timed_out()),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
            return Err(FidlgenError::FormatterFailed {
                path:   self.path.display().to_string(),
                status: status.to_string(),
                stderr: if stderr.is_empty() { "(no diagnostic output)".to_string() } else { stderr },
            });
        }
        fed?;
        tracing::debug!(formatter = %self.path.display(), bytes = stdout.len(), "formatter finished");
        Ok(stdout)
    }

    fn wait(&mut self) -> Result<ExitStatus> {
        loop {
            if let Some(status) = self.child.try_wait()? {
                self.reaped = true;
                return Ok(status);
            }
            if Instant::now() >= self.deadline {
                return Err(self.timed_out());
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn timed_out(&mut self) -> FidlgenError {
        tracing::warn!(formatter = %self.path.display(), "formatter timed out, killing it");
        self.terminate();
        FidlgenError::FormatterTimeout {
            path:    self.path.display().to_string(),
            timeout: self.timeout,
        }
    }

    /// Kills and reaps the child. The I/O threads are left to finish on
    /// their own once the pipes close.
    fn terminate(&mut self) {
        self.input.take();
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
            self.reaped = true;
        }
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn read_all<R: Read>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(buf)
}

fn spawn_io<T, F>(f: F) -> Receiver<io::Result<T>>
where
    T: Send + 'static,
    F: FnOnce() -> io::Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(f());
    });
    rx
}

/// The thread's result, or `None` once `deadline` has passed.
fn recv_before<T>(rx: &Receiver<io::Result<T>>, deadline: Instant) -> Option<io::Result<T>> {
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(result) => Some(result),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(Err(io::Error::new(
            io::ErrorKind::Other,
            "formatter I/O thread panicked",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_formatter_passes_writes_through() {
        let mut pipe = Formatter::default().pipe(Vec::new()).unwrap();
        pipe.write_all(b"class A {}\n").unwrap();
        pipe.write_all(b"class B {}\n").unwrap();
        let out = pipe.close().unwrap();
        assert_eq!(out, b"class A {}\nclass B {}\n");
    }

    #[cfg(unix)]
    #[test]
    fn identity_formatter_round_trips() {
        let formatter = Formatter::new(Some(PathBuf::from("/bin/cat")));
        let mut pipe = formatter.pipe(Vec::new()).unwrap();
        pipe.write_all(b"library fidl_test;\n").unwrap();
        assert_eq!(pipe.close().unwrap(), b"library fidl_test;\n");
    }

    #[cfg(unix)]
    #[test]
    fn failing_formatter_is_an_error_and_leaves_output_untouched() {
        let formatter = Formatter::new(Some(PathBuf::from("/bin/false")));
        let mut out = Vec::new();
        let mut pipe = formatter.pipe(&mut out).unwrap();
        pipe.write_all(b"library fidl_test;\n").unwrap();
        match pipe.close() {
            Err(FidlgenError::FormatterFailed { stderr, .. }) => assert_eq!(stderr, "(no diagnostic output)"),
            Err(other) => panic!("unexpected error {}", other),
            Ok(_) => panic!("formatter should have failed"),
        }
        assert!(out.is_empty());
    }

    #[test]
    fn missing_formatter_fails_to_spawn() {
        let formatter = Formatter::new(Some(PathBuf::from("/nonexistent/dartfmt")));
        assert!(matches!(
            formatter.pipe(Vec::new()),
            Err(FidlgenError::FormatterSpawn { .. })
        ));
    }
}
