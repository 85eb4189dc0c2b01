//! Server and launcher process supervision.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use fikasync_core::Config;

use crate::endpoint::{detect_endpoint, port_open, Endpoint, CONNECT_TIMEOUT};
use crate::error::LaunchError;

/// How long to wait for the server port before opening the launcher anyway.
pub const READY_TIMEOUT: Duration = Duration::from_secs(60);
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How a play session went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub endpoint: Endpoint,
    /// The server port answered before the timeout.
    pub server_ready: bool,
    pub launcher_started: bool,
}

#[derive(Debug, Clone)]
pub struct GameLauncher {
    server_path: PathBuf,
    launcher_path: PathBuf,
    ready_timeout: Duration,
    poll_interval: Duration,
}

impl GameLauncher {
    pub fn new(server_path: impl Into<PathBuf>, launcher_path: impl Into<PathBuf>) -> Self {
        Self {
            server_path: server_path.into(),
            launcher_path: launcher_path.into(),
            ready_timeout: READY_TIMEOUT,
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.server_path(), config.launcher_path())
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn server_path(&self) -> &Path {
        &self.server_path
    }

    /// Run one play session.
    ///
    /// Starts the server in its own directory, waits for its port, starts
    /// the launcher when present and calls `wait_for_user` once the game is
    /// up. The server is stopped when `wait_for_user` returns. A server that
    /// exits before that is an error, so no shutdown sync should follow.
    pub fn launch<F>(&self, wait_for_user: F) -> Result<SessionOutcome, LaunchError>
    where
        F: FnOnce(),
    {
        if !self.server_path.is_file() {
            return Err(LaunchError::ServerNotFound {
                path: self.server_path.clone(),
            });
        }
        let server_dir = parent_dir(&self.server_path);
        let endpoint = detect_endpoint(&server_dir);

        tracing::info!(path = %self.server_path.display(), "starting SPT server");
        let mut server = ServerGuard(spawn(&self.server_path, &server_dir, true)?);

        let server_ready = self.wait_ready(&mut server.0, &endpoint)?;
        if server_ready {
            tracing::info!(%endpoint, "server is up");
        } else {
            tracing::warn!(%endpoint, "server port did not open in time, starting launcher anyway");
        }

        let launcher_started = if self.launcher_path.is_file() {
            tracing::info!(path = %self.launcher_path.display(), "opening launcher");
            // The launcher is left running after the session.
            spawn(&self.launcher_path, &parent_dir(&self.launcher_path), false)?;
            true
        } else {
            tracing::warn!(path = %self.launcher_path.display(), "launcher not found");
            false
        };

        wait_for_user();

        tracing::info!("stopping server");
        server.stop();
        Ok(SessionOutcome {
            endpoint,
            server_ready,
            launcher_started,
        })
    }

    /// Poll until the port opens (`true`), the timeout passes (`false`) or
    /// the server exits (error).
    fn wait_ready(&self, server: &mut Child, endpoint: &Endpoint) -> Result<bool, LaunchError> {
        let deadline = Instant::now() + self.ready_timeout;
        loop {
            if let Some(status) = server.try_wait().map_err(LaunchError::Wait)? {
                return Err(LaunchError::ServerExited {
                    code: status.code(),
                });
            }
            if port_open(endpoint, CONNECT_TIMEOUT) {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                break;
            }
            tracing::debug!(%endpoint, "waiting for server");
            thread::sleep(self.poll_interval);
        }

        match server.try_wait().map_err(LaunchError::Wait)? {
            Some(status) => Err(LaunchError::ServerExited {
                code: status.code(),
            }),
            None => Ok(false),
        }
    }
}

/// Kills the server when dropped, so an early return or a panic in the
/// user callback does not leave it running.
struct ServerGuard(Child);

impl ServerGuard {
    fn stop(&mut self) {
        match self.0.try_wait() {
            Ok(Some(_)) => {}
            _ => {
                if let Err(err) = self.0.kill() {
                    tracing::warn!(error = %err, "could not stop server");
                    return;
                }
                if self.0.wait().is_ok() {
                    tracing::info!("server stopped");
                }
            }
        }
    }
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        if let Ok(None) = self.0.try_wait() {
            let _ = self.0.kill();
            let _ = self.0.wait();
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn spawn(program: &Path, dir: &Path, own_console: bool) -> Result<Child, LaunchError> {
    let mut command = Command::new(program);
    command
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;
        if own_console {
            command.creation_flags(CREATE_NEW_CONSOLE);
        }
    }
    #[cfg(not(windows))]
    let _ = own_console;

    command.spawn().map_err(|source| LaunchError::Spawn {
        path: program.to_path_buf(),
        source,
    })
}
