// Image, network, volume and engine-level models

/// Networks the engine creates itself; never counted as custom and never pruned.
pub const SYSTEM_NETWORKS: [&str; 3] = ["bridge", "host", "none"];

pub fn is_system_network(name: &str) -> bool {
    SYSTEM_NETWORKS.contains(&name)
}

#[derive(Debug, Clone, Default)]
pub struct ImageSummary {
    pub id: String,
    pub repo_tags: Vec<String>,
    pub size: u64,
}

impl ImageSummary {
    /// Untagged, or tagged only with the null tag.
    pub fn is_dangling(&self) -> bool {
        match self.repo_tags.as_slice() {
            [] => true,
            [only] => only == "<none>:<none>",
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NetworkSummary {
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct VolumeSummary {
    pub name: String,
}

/// Engine identity and counters for `clear --info`.
#[derive(Debug, Clone, Default)]
pub struct EngineInfo {
    pub version: String,
    pub containers: u64,
    pub running: u64,
    pub paused: u64,
    pub stopped: u64,
    pub images: u64,
    pub storage_driver: String,
    pub root_dir: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskUsage {
    pub layers_size: u64,
    pub images_size: u64,
    pub volumes_size: u64,
    pub build_cache_size: u64,
}

impl DiskUsage {
    /// Layers + images + volumes; build cache is reported separately.
    pub fn total(&self) -> u64 {
        self.layers_size + self.images_size + self.volumes_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(tags: &[&str]) -> ImageSummary {
        ImageSummary {
            id: "sha256:abc".into(),
            repo_tags: tags.iter().map(|t| t.to_string()).collect(),
            size: 0,
        }
    }

    #[test]
    fn dangling_detection() {
        assert!(image(&[]).is_dangling());
        assert!(image(&["<none>:<none>"]).is_dangling());
        assert!(!image(&["nginx:latest"]).is_dangling());
        assert!(!image(&["<none>:<none>", "nginx:latest"]).is_dangling());
    }

    #[test]
    fn system_networks_are_recognised() {
        assert!(is_system_network("bridge"));
        assert!(is_system_network("host"));
        assert!(is_system_network("none"));
        assert!(!is_system_network("my_app_default"));
    }

    #[test]
    fn disk_usage_total_excludes_build_cache() {
        let usage = DiskUsage {
            layers_size: 10,
            images_size: 20,
            volumes_size: 30,
            build_cache_size: 1000,
        };
        assert_eq!(usage.total(), 60);
    }
}
