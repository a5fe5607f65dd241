// Domain models shared by the cleanup and inspect paths

mod cleanup;
mod container;
mod resources;
mod telemetry;

pub use cleanup::{
    CleanupStats, ContainerCounts, ImageCounts, NetworkCounts, PruneReport, ResourceSnapshot,
};
pub use container::{
    ContainerConfig, ContainerState, ContainerSummary, DeviceMapping, MountPoint, PortBinding,
    short_id,
};
pub use resources::{
    DiskUsage, EngineInfo, ImageSummary, NetworkSummary, SYSTEM_NETWORKS, VolumeSummary,
    is_system_network,
};
pub use telemetry::{InterfaceCounters, TelemetryReading, TelemetrySample};
