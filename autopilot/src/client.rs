//! Live client: reads world snapshots from the game over TCP and answers each
//! with one key byte.

use crate::config::AutopilotConfig;
use crate::protocol::{action_key, LineBuffer, WorldSnapshot};
use anyhow::{Context, Result};
use asteroid_planner_core::{Action, Planner};
use serde::Serialize;
use std::io::{self, BufRead, ErrorKind, Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Socket read timeout; bounds how long a quit request can go unnoticed.
pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Complete lines taken off the socket (stale ones in between are dropped).
    pub snapshots: u64,
    pub decisions: u64,
    pub malformed: u64,
    pub thrust: u64,
    pub rotate_left: u64,
    pub rotate_right: u64,
}

impl SessionSummary {
    fn record(&mut self, action: Action) {
        self.decisions += 1;
        match action {
            Action::Thrust => self.thrust += 1,
            Action::RotateLeft => self.rotate_left += 1,
            Action::RotateRight => self.rotate_right += 1,
        }
    }
}

/// Drives one session over any byte stream until the peer closes it or
/// `stop` is raised. Read timeouts are treated as "nothing new yet".
pub fn run_session<S: Read + Write>(
    stream: &mut S,
    planner: &mut Planner,
    stop: &AtomicBool,
) -> Result<SessionSummary> {
    let physics = planner.config().physics;
    let mut buffer = LineBuffer::new();
    let mut chunk = [0u8; 16 * 1024];
    let mut summary = SessionSummary::default();

    while !stop.load(Ordering::Relaxed) {
        match stream.read(&mut chunk) {
            Ok(0) => {
                tracing::info!("server closed connection");
                break;
            }
            Ok(n) => buffer.push(&chunk[..n]),
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                continue;
            }
            Err(err) => return Err(err).context("failed reading from game"),
        }

        let Some(line) = buffer.latest_complete() else {
            continue;
        };
        summary.snapshots += 1;

        let snapshot = match WorldSnapshot::from_json(&line) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                summary.malformed += 1;
                tracing::warn!(error = %format!("{err:#}"), "skipping snapshot");
                continue;
            }
        };

        let report =
            planner.plan_snapshot(&snapshot.ship(&physics), &snapshot.asteroids(&physics));
        match stream.write_all(&[action_key(report.action)]) {
            Ok(()) => summary.record(report.action),
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::BrokenPipe | ErrorKind::ConnectionReset
                ) =>
            {
                tracing::info!("server closed connection");
                break;
            }
            Err(err) => return Err(err).context("failed sending key"),
        }
        tracing::debug!(
            action = %report.action,
            asteroids = snapshot.asteroids.len(),
            clearance = report.root_clearance,
            "sent key"
        );
    }

    if stop.load(Ordering::Relaxed) {
        tracing::info!("quit requested");
    }
    Ok(summary)
}

pub fn connect_and_run(config: &AutopilotConfig, stop: &AtomicBool) -> Result<SessionSummary> {
    let mut planner = Planner::new(config.planner)
        .with_context(|| format!("invalid planner config in '{}'", config.id))?;
    let endpoint = config.endpoint();
    let mut stream = TcpStream::connect(&endpoint)
        .with_context(|| format!("failed connecting to {endpoint}"))?;
    stream
        .set_read_timeout(Some(READ_TIMEOUT))
        .context("failed setting read timeout")?;
    stream.set_nodelay(true).context("failed setting TCP_NODELAY")?;
    tracing::info!(
        %endpoint,
        horizon = config.planner.horizon,
        "connected to game; type q + enter to quit"
    );

    let summary = run_session(&mut stream, &mut planner, stop)?;
    tracing::info!(
        snapshots = summary.snapshots,
        decisions = summary.decisions,
        malformed = summary.malformed,
        "session ended"
    );
    Ok(summary)
}

/// Raises `stop` when a line reading `q` arrives on stdin. End of input
/// leaves the flag alone so the client keeps running when detached.
pub fn spawn_quit_listener(stop: Arc<AtomicBool>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                return;
            };
            if line.trim().eq_ignore_ascii_case("q") {
                stop.store(true, Ordering::Relaxed);
                return;
            }
        }
    })
}
