// Periodic resource sampling for one container

use crate::format::readable_size;
use crate::gateway::Gateway;
use crate::models::{TelemetryReading, TelemetrySample};
use std::io::Write;
use std::sync::Arc;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// `(cpu delta / system delta) * cpus * 100`, or 0 unless both deltas are positive.
pub fn cpu_percent(s: &TelemetrySample) -> f64 {
    let cpu_delta = s.cpu_total_usage.saturating_sub(s.precpu_total_usage);
    let system_delta = s.system_cpu_usage.saturating_sub(s.presystem_cpu_usage);
    if cpu_delta > 0 && system_delta > 0 {
        (cpu_delta as f64 / system_delta as f64) * s.online_cpus as f64 * 100.0
    } else {
        0.0
    }
}

/// Usage as a percentage of the limit; 0 when no limit is reported.
pub fn memory_percent(usage: u64, limit: u64) -> f64 {
    if limit == 0 {
        return 0.0;
    }
    usage as f64 / limit as f64 * 100.0
}

pub fn compute_reading(s: &TelemetrySample) -> TelemetryReading {
    let (network_rx_bytes, network_tx_bytes) = s
        .networks
        .iter()
        .fold((0u64, 0u64), |(rx, tx), n| (rx + n.rx_bytes, tx + n.tx_bytes));
    TelemetryReading {
        cpu_percent: cpu_percent(s),
        memory_usage_bytes: s.memory_usage_bytes,
        memory_limit_bytes: s.memory_limit_bytes,
        memory_percent: memory_percent(s.memory_usage_bytes, s.memory_limit_bytes),
        network_rx_bytes,
        network_tx_bytes,
    }
}

pub fn render_reading(r: &TelemetryReading) -> String {
    format!(
        "CPU: {:.2}% | Memory: {} / {} ({:.2}%) | Net I/O: {} rx / {} tx",
        r.cpu_percent,
        readable_size(r.memory_usage_bytes),
        readable_size(r.memory_limit_bytes),
        r.memory_percent,
        readable_size(r.network_rx_bytes),
        readable_size(r.network_tx_bytes),
    )
}

/// Samples every `period` until `cancel` fires, overwriting one terminal line.
/// The first sample is taken one full period after start.
pub async fn run_telemetry(
    gateway: Arc<dyn Gateway>,
    id: String,
    period: Duration,
    cancel: CancellationToken,
    mut out: Box<dyn Write + Send>,
) {
    let mut tick = interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            r = gateway.stats_snapshot(&id) => r,
        };

        match result {
            Ok(sample) => {
                let line = render_reading(&compute_reading(&sample));
                if let Err(e) = write!(out, "\r{}", line).and_then(|_| out.flush()) {
                    debug!(error = %e, operation = "render_stats", "terminal closed");
                    break;
                }
            }
            Err(e) if e.is_decode() => {
                debug!(error = %e, operation = "stats_snapshot", "skipping undecodable sample");
            }
            Err(e) => {
                warn!(error = %e, operation = "stats_snapshot", container = %id, "stats fetch failed");
                let _ = writeln!(out, "\nError: failed to get container stats: {}", e);
            }
        }
    }
    debug!(container = %id, "telemetry loop stopped");
}
