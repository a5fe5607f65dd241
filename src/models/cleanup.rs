// Cleanup accounting models

use super::{ContainerState, ContainerSummary, ImageSummary, NetworkSummary};

/// Counters for one cleanup run. Starts at zero and only grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupStats {
    pub containers_removed: u64,
    pub images_removed: u64,
    pub networks_removed: u64,
    pub volumes_removed: u64,
    /// Bytes, summed from the image and volume prune reports only.
    pub space_reclaimed: u64,
}

impl CleanupStats {
    pub fn total_removed(&self) -> u64 {
        self.containers_removed + self.images_removed + self.networks_removed + self.volumes_removed
    }

    pub fn is_empty(&self) -> bool {
        self.total_removed() == 0
    }
}

/// Result of one engine-side batch prune.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub removed: u64,
    pub space_reclaimed: u64,
}

/// Point-in-time usage shown before cleanup. Each section is None when its
/// listing failed.
#[derive(Debug, Clone, Default)]
pub struct ResourceSnapshot {
    pub containers: Option<ContainerCounts>,
    pub images: Option<ImageCounts>,
    pub networks: Option<NetworkCounts>,
    pub volumes: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerCounts {
    pub total: u64,
    pub running: u64,
    pub stopped: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageCounts {
    pub total: u64,
    pub dangling: u64,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkCounts {
    pub total: u64,
    pub custom: u64,
}

impl ContainerCounts {
    pub fn from_summaries(containers: &[ContainerSummary]) -> Self {
        let running = containers
            .iter()
            .filter(|c| c.state == ContainerState::Running)
            .count() as u64;
        let total = containers.len() as u64;
        Self {
            total,
            running,
            stopped: total - running,
        }
    }
}

impl ImageCounts {
    pub fn from_summaries(images: &[ImageSummary]) -> Self {
        Self {
            total: images.len() as u64,
            dangling: images.iter().filter(|i| i.is_dangling()).count() as u64,
            size: images.iter().map(|i| i.size).sum(),
        }
    }
}

impl NetworkCounts {
    pub fn from_summaries(networks: &[NetworkSummary]) -> Self {
        Self {
            total: networks.len() as u64,
            custom: networks
                .iter()
                .filter(|n| !super::is_system_network(&n.name))
                .count() as u64,
        }
    }
}
