//! One-directional local pipes, one connection per message.
//!
//! On Unix a pipe named `name` is a Unix domain socket at
//! `<dir>/<name>.sock`. The reader accepts a connection, reads to EOF and
//! drops the connection. The writer connects, retrying until the reader is
//! listening, writes the whole payload and shuts down its write half.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn pipe_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.sock"))
}

#[cfg(unix)]
mod imp {
    use std::io::{self, Read, Write};
    use std::net::Shutdown;
    use std::os::unix::net::{UnixListener, UnixStream};
    use std::path::{Path, PathBuf};
    use std::thread;
    use std::time::Duration;

    use tracing::{debug, trace};

    pub struct PipeReader {
        path: PathBuf,
        listener: UnixListener,
    }

    impl PipeReader {
        pub fn bind(path: PathBuf) -> io::Result<Self> {
            if path.exists() {
                remove_stale(&path)?;
            }
            let listener = UnixListener::bind(&path)?;
            debug!(path = %path.display(), "pipe listening");
            Ok(Self { path, listener })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        /// Block until a writer connects.
        pub fn accept(&self) -> io::Result<UnixStream> {
            self.listener.accept().map(|(stream, _)| stream)
        }
    }

    /// Unlink a socket file left behind by a previous run. A file some
    /// reader still listens on is kept and reported as `AddrInUse`.
    fn remove_stale(path: &Path) -> io::Result<()> {
        match UnixStream::connect(path) {
            Ok(_) => Err(io::Error::new(
                io::ErrorKind::AddrInUse,
                format!("{} already has a live reader", path.display()),
            )),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
                ) =>
            {
                debug!(path = %path.display(), "removing stale pipe file");
                match std::fs::remove_file(path) {
                    Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                    _ => Ok(()),
                }
            }
            Err(e) => Err(e),
        }
    }

    impl Drop for PipeReader {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    pub fn read_message(stream: &mut UnixStream) -> io::Result<String> {
        let mut message = String::new();
        stream.read_to_string(&mut message)?;
        Ok(message)
    }

    pub fn write_message(path: &Path, payload: &str, retry: Duration) -> io::Result<()> {
        let mut stream = loop {
            match UnixStream::connect(path) {
                Ok(stream) => break stream,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused
                    ) =>
                {
                    trace!(path = %path.display(), "pipe not listening yet, retrying");
                    thread::sleep(retry);
                }
                Err(e) => return Err(e),
            }
        };
        stream.write_all(payload.as_bytes())?;
        stream.shutdown(Shutdown::Write)?;
        Ok(())
    }
}

#[cfg(not(unix))]
mod imp {
    use std::io;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn unsupported() -> io::Error {
        io::Error::new(
            io::ErrorKind::Unsupported,
            "hot-reload pipes need Unix domain sockets",
        )
    }

    pub struct PipeReader {
        path: PathBuf,
    }

    pub struct PipeStream;

    impl PipeReader {
        pub fn bind(_path: PathBuf) -> io::Result<Self> {
            Err(unsupported())
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        pub fn accept(&self) -> io::Result<PipeStream> {
            Err(unsupported())
        }
    }

    pub fn read_message(_stream: &mut PipeStream) -> io::Result<String> {
        Err(unsupported())
    }

    pub fn write_message(_path: &Path, _payload: &str, _retry: Duration) -> io::Result<()> {
        Err(unsupported())
    }
}

pub use imp::{read_message, PipeReader};

/// Deliver one message to the pipe `name` under `dir`. Blocks until a reader
/// is listening; there is no timeout.
pub fn send_message(dir: &Path, name: &str, payload: &str, retry: Duration) -> io::Result<()> {
    imp::write_message(&pipe_path(dir, name), payload, retry)
}
