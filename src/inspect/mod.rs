// Live view of one container: a one-shot info block, then a telemetry loop and
// a log loop running side by side until the user interrupts.

mod logs;
mod telemetry;

pub use logs::{LogExit, tail_logs};
pub use telemetry::{compute_reading, cpu_percent, memory_percent, render_reading, run_telemetry};

use crate::config::InspectConfig;
use crate::format::{compact_duration, rule};
use crate::gateway::{Gateway, LogOptions};
use crate::models::ContainerConfig;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How long the session waits for both loops after cancelling.
const LOOP_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Source of independent terminal writers, one per loop.
pub trait Terminal: Send + Sync + 'static {
    fn writer(&self) -> Box<dyn Write + Send>;
}

pub struct Stdout;

impl Terminal for Stdout {
    fn writer(&self) -> Box<dyn Write + Send> {
        Box::new(std::io::stdout())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Starting,
    Monitoring,
    Cancelling,
    Stopped,
}

fn transition(state: &mut SessionState, next: SessionState, id: &str) {
    debug!(container = id, from = ?*state, to = ?next, "session state");
    *state = next;
}

pub fn render_basic_info<W: Write + ?Sized>(
    config: &ContainerConfig,
    now: DateTime<Utc>,
    out: &mut W,
) -> std::io::Result<()> {
    writeln!(out, "Container: {}", config.display_name())?;
    writeln!(out, "ID: {}", config.short_id())?;
    writeln!(out, "Image: {}", config.image)?;
    writeln!(out, "Status: {}", config.status)?;
    if let Some(uptime) = config.uptime_at(now) {
        writeln!(out, "Uptime: {}", compact_duration(uptime))?;
    }

    if !config.port_bindings.is_empty() {
        writeln!(out, "Port mappings:")?;
        for p in &config.port_bindings {
            writeln!(out, "   {} -> {}", p.host_port, p.container_port)?;
        }
    }

    if !config.mounts.is_empty() {
        writeln!(out, "Mounts:")?;
        for m in &config.mounts {
            writeln!(out, "   {} -> {} ({})", m.source, m.destination, m.kind)?;
        }
    }
    Ok(())
}

/// Runs one monitoring session for `id` and returns after `shutdown`
/// resolves. Failing to inspect the container aborts before any loop starts.
/// Both loops are cancelled on every return path.
pub async fn inspect_container<F>(
    gateway: Arc<dyn Gateway>,
    id: &str,
    config: &InspectConfig,
    terminal: Arc<dyn Terminal>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let mut state = SessionState::Starting;
    debug!(container = id, state = ?state, "session state");

    let container = gateway
        .inspect_container(id)
        .await
        .with_context(|| format!("failed to get container config for {}", id))?;

    let mut out = terminal.writer();
    render_basic_info(&container, Utc::now(), &mut out)?;

    let cancel = CancellationToken::new();
    let _cancel_on_exit = cancel.clone().drop_guard();

    let telemetry = tokio::spawn(run_telemetry(
        gateway.clone(),
        id.to_string(),
        Duration::from_millis(config.stats_interval_ms),
        cancel.child_token(),
        terminal.writer(),
    ));
    let logs = tokio::spawn(tail_logs(
        gateway.clone(),
        id.to_string(),
        LogOptions::follow_with_tail(config.log_tail),
        cancel.child_token(),
        terminal.writer(),
    ));

    writeln!(out)?;
    writeln!(out, "Monitoring started (refresh every {} ms)", config.stats_interval_ms)?;
    writeln!(out, "Press Ctrl+C to stop")?;
    writeln!(out, "{}", rule('='))?;
    out.flush()?;
    transition(&mut state, SessionState::Monitoring, id);

    shutdown.await;

    transition(&mut state, SessionState::Cancelling, id);
    cancel.cancel();
    match tokio::time::timeout(LOOP_JOIN_TIMEOUT, async { tokio::join!(telemetry, logs) }).await {
        Ok((telemetry, logs)) => {
            if let Err(e) = telemetry {
                warn!(error = %e, operation = "join_loops", task = "telemetry", "monitoring task failed");
            }
            match logs {
                Ok(exit) => debug!(container = id, log_exit = ?exit, "loops stopped"),
                Err(e) => warn!(error = %e, operation = "join_loops", task = "logs", "monitoring task failed"),
            }
        }
        Err(_) => warn!(container = id, "monitoring loops did not stop in time"),
    }
    transition(&mut state, SessionState::Stopped, id);

    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "Monitoring stopped.")?;
    out.flush()?;
    Ok(())
}

/// Resolves on the first SIGINT or SIGTERM. Handlers are installed when this
/// is called, so a signal arriving before the future is polled is kept.
#[cfg(unix)]
pub fn shutdown_signal() -> anyhow::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{SignalKind, signal};
    let mut interrupt = signal(SignalKind::interrupt()).context("installing SIGINT handler")?;
    let mut terminate = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;
    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => {}
            _ = terminate.recv() => {}
        }
    })
}

#[cfg(not(unix))]
pub fn shutdown_signal() -> anyhow::Result<impl Future<Output = ()>> {
    Ok(async {
        let _ = tokio::signal::ctrl_c().await;
    })
}
