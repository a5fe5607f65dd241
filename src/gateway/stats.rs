// Decode a raw Docker stats response into a TelemetrySample.

use super::GatewayError;
use crate::models::{InterfaceCounters, TelemetrySample};
use bollard::secret::ContainerStatsResponse;

const OPERATION: &str = "decode_stats";

fn missing(field: &str) -> GatewayError {
    GatewayError::Decode {
        operation: OPERATION,
        reason: format!("missing {field}"),
    }
}

/// Both the current and the previous CPU counters must be present; memory
/// and network sections default to zero when absent.
pub fn decode_stats(s: &ContainerStatsResponse) -> Result<TelemetrySample, GatewayError> {
    let cpu_stats = s.cpu_stats.as_ref().ok_or_else(|| missing("cpu_stats"))?;
    let precpu_stats = s
        .precpu_stats
        .as_ref()
        .ok_or_else(|| missing("precpu_stats"))?;

    let cpu_usage = cpu_stats
        .cpu_usage
        .as_ref()
        .ok_or_else(|| missing("cpu_stats.cpu_usage"))?;
    let precpu_usage = precpu_stats.cpu_usage.as_ref();

    let percpu_len = cpu_usage.percpu_usage.as_ref().map_or(0, |v| v.len() as u32);
    let online_cpus = match cpu_stats.online_cpus {
        Some(n) if n > 0 => n,
        _ => percpu_len,
    };

    let memory_usage_bytes = s.memory_stats.as_ref().and_then(|m| m.usage).unwrap_or(0);
    let memory_limit_bytes = s.memory_stats.as_ref().and_then(|m| m.limit).unwrap_or(0);

    let mut networks: Vec<InterfaceCounters> = s
        .networks
        .as_ref()
        .map(|n| {
            n.iter()
                .map(|(name, v)| InterfaceCounters {
                    name: name.clone(),
                    rx_bytes: v.rx_bytes.unwrap_or(0),
                    tx_bytes: v.tx_bytes.unwrap_or(0),
                })
                .collect()
        })
        .unwrap_or_default();
    networks.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(TelemetrySample {
        cpu_total_usage: cpu_usage.total_usage.unwrap_or(0),
        precpu_total_usage: precpu_usage.and_then(|u| u.total_usage).unwrap_or(0),
        system_cpu_usage: cpu_stats.system_cpu_usage.unwrap_or(0),
        presystem_cpu_usage: precpu_stats.system_cpu_usage.unwrap_or(0),
        online_cpus,
        memory_usage_bytes,
        memory_limit_bytes,
        networks,
    })
}
