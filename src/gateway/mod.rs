// Container engine access consumed by the cleanup and inspect paths

mod docker;
mod stats;

pub use docker::DockerGateway;
pub use stats::decode_stats;

use crate::models::{
    ContainerConfig, ContainerState, ContainerSummary, DiskUsage, EngineInfo, ImageSummary,
    NetworkSummary, PruneReport, TelemetrySample, VolumeSummary,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("failed to create Docker client: {0}")]
    Connect(#[source] bollard::errors::Error),
    #[error("{operation} failed: {source}")]
    Engine {
        operation: &'static str,
        #[source]
        source: bollard::errors::Error,
    },
    #[error("{operation}: unexpected response: {reason}")]
    Decode {
        operation: &'static str,
        reason: String,
    },
    #[error("no such container: {0}")]
    NotFound(String),
}

impl GatewayError {
    pub fn engine(operation: &'static str) -> impl FnOnce(bollard::errors::Error) -> Self {
        move |source| GatewayError::Engine { operation, source }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, GatewayError::Decode { .. })
    }
}

/// Which containers to list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerFilter {
    /// Include non-running containers.
    pub all: bool,
    /// Restrict to these states; empty means any.
    pub states: Vec<ContainerState>,
}

impl ContainerFilter {
    pub fn everything() -> Self {
        Self {
            all: true,
            states: Vec::new(),
        }
    }

    /// Stopped containers eligible for removal.
    pub fn reclaimable() -> Self {
        Self {
            all: true,
            states: vec![ContainerState::Exited, ContainerState::Created],
        }
    }
}

/// Log stream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    pub stdout: bool,
    pub stderr: bool,
    pub follow: bool,
    pub timestamps: bool,
    /// Number of trailing lines to start from.
    pub tail: u32,
}

impl LogOptions {
    pub fn follow_with_tail(tail: u32) -> Self {
        Self {
            stdout: true,
            stderr: true,
            follow: true,
            timestamps: true,
            tail,
        }
    }
}

/// Raw log chunks, each one multiplexed frame: 8-byte header then payload.
pub type LogStream = BoxStream<'static, Result<Bytes, GatewayError>>;

/// Capability set over a container engine. Implementations must tolerate
/// concurrent calls for the same container.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn list_containers(
        &self,
        filter: ContainerFilter,
    ) -> Result<Vec<ContainerSummary>, GatewayError>;

    async fn remove_container(&self, id: &str) -> Result<(), GatewayError>;

    async fn inspect_container(&self, id: &str) -> Result<ContainerConfig, GatewayError>;

    async fn list_images(&self) -> Result<Vec<ImageSummary>, GatewayError>;

    async fn list_networks(&self) -> Result<Vec<NetworkSummary>, GatewayError>;

    async fn list_volumes(&self) -> Result<Vec<VolumeSummary>, GatewayError>;

    /// Prune unused images; only dangling ones when `dangling_only`.
    async fn prune_images(&self, dangling_only: bool) -> Result<PruneReport, GatewayError>;

    /// Prune unused networks. Engine-created networks are never candidates.
    async fn prune_networks(&self) -> Result<PruneReport, GatewayError>;

    async fn prune_volumes(&self) -> Result<PruneReport, GatewayError>;

    /// One non-streaming stats sample.
    async fn stats_snapshot(&self, id: &str) -> Result<TelemetrySample, GatewayError>;

    async fn stream_logs(&self, id: &str, options: LogOptions) -> Result<LogStream, GatewayError>;

    async fn system_info(&self) -> Result<EngineInfo, GatewayError>;

    async fn disk_usage(&self) -> Result<DiskUsage, GatewayError>;
}
