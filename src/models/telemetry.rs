// Container telemetry models

/// Cumulative counters from one stats call. The engine returns the previous
/// read's CPU counters alongside the current ones, so one sample is enough to
/// derive a rate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySample {
    pub cpu_total_usage: u64,
    pub precpu_total_usage: u64,
    pub system_cpu_usage: u64,
    pub presystem_cpu_usage: u64,
    /// Logical CPUs available to the container.
    pub online_cpus: u32,
    pub memory_usage_bytes: u64,
    pub memory_limit_bytes: u64,
    pub networks: Vec<InterfaceCounters>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub name: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Values derived from a sample for display.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TelemetryReading {
    pub cpu_percent: f64,
    pub memory_usage_bytes: u64,
    pub memory_limit_bytes: u64,
    pub memory_percent: f64,
    pub network_rx_bytes: u64,
    pub network_tx_bytes: u64,
}
