// Docker container models

use chrono::{DateTime, Utc};

/// Docker container state, parsed from the engine's lowercase state string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    Unknown,
}

impl ContainerState {
    /// Parse from Docker API state string (e.g. "running", "exited").
    pub fn from_docker(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "created" => ContainerState::Created,
            "running" => ContainerState::Running,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "removing" => ContainerState::Removing,
            "exited" => ContainerState::Exited,
            "dead" => ContainerState::Dead,
            _ => ContainerState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerState::Created => "created",
            ContainerState::Running => "running",
            ContainerState::Paused => "paused",
            ContainerState::Restarting => "restarting",
            ContainerState::Removing => "removing",
            ContainerState::Exited => "exited",
            ContainerState::Dead => "dead",
            ContainerState::Unknown => "unknown",
        }
    }

    /// Stopped containers that the cleanup pass removes.
    pub fn is_reclaimable(&self) -> bool {
        matches!(self, ContainerState::Exited | ContainerState::Created)
    }
}

impl std::fmt::Display for ContainerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ContainerSummary {
    pub id: String,
    pub names: Vec<String>,
    pub image: String,
    pub state: ContainerState,
}

impl ContainerSummary {
    /// First name without the leading `/`, or the short id when unnamed.
    pub fn display_name(&self) -> String {
        self.names
            .first()
            .map(|n| n.trim_start_matches('/').to_string())
            .unwrap_or_else(|| short_id(&self.id).to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortBinding {
    /// Container side, e.g. "80/tcp".
    pub container_port: String,
    pub host_ip: String,
    pub host_port: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
    pub kind: String,
    pub source: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMapping {
    pub path_on_host: String,
    pub path_in_container: String,
}

/// Static configuration of one container as returned by inspect.
#[derive(Debug, Clone, Default)]
pub struct ContainerConfig {
    pub id: String,
    /// Raw engine name, usually with a leading `/`.
    pub name: String,
    pub image: String,
    pub status: String,
    pub running: bool,
    pub started_at: Option<String>,
    pub port_bindings: Vec<PortBinding>,
    pub mounts: Vec<MountPoint>,
    pub devices: Vec<DeviceMapping>,
    pub nano_cpus: i64,
    pub memory_bytes: i64,
    pub restart_policy: String,
    pub network_mode: String,
}

impl ContainerConfig {
    pub fn display_name(&self) -> &str {
        self.name.trim_start_matches('/')
    }

    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }

    /// Time since the container started, rounded to whole seconds.
    /// None when the container is not running or the timestamp does not parse.
    pub fn uptime_at(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        if !self.running {
            return None;
        }
        let started = DateTime::parse_from_rfc3339(self.started_at.as_deref()?).ok()?;
        let elapsed = now.signed_duration_since(started.with_timezone(&Utc));
        let millis = elapsed.num_milliseconds().max(0);
        Some(chrono::Duration::seconds((millis + 500) / 1000))
    }
}

/// First 12 characters of a container or image id.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(12) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn from_docker_parses_known_states() {
        assert_eq!(ContainerState::from_docker("running"), ContainerState::Running);
        assert_eq!(ContainerState::from_docker("Exited"), ContainerState::Exited);
        assert_eq!(ContainerState::from_docker("created"), ContainerState::Created);
        assert_eq!(ContainerState::from_docker("bogus"), ContainerState::Unknown);
    }

    #[test]
    fn only_exited_and_created_are_reclaimable() {
        assert!(ContainerState::Exited.is_reclaimable());
        assert!(ContainerState::Created.is_reclaimable());
        assert!(!ContainerState::Running.is_reclaimable());
        assert!(!ContainerState::Paused.is_reclaimable());
    }

    #[test]
    fn short_id_handles_short_input() {
        assert_eq!(short_id("0123456789abcdef"), "0123456789ab");
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id(""), "");
    }

    #[test]
    fn uptime_rounds_to_whole_seconds() {
        let config = ContainerConfig {
            running: true,
            started_at: Some("2024-05-01T10:00:00.000000000Z".into()),
            ..Default::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 11, 2, 3).unwrap()
            + chrono::Duration::milliseconds(600);
        let uptime = config.uptime_at(now).unwrap();
        assert_eq!(uptime.num_seconds(), 3724);
    }

    #[test]
    fn uptime_is_none_when_not_running() {
        let config = ContainerConfig {
            running: false,
            started_at: Some("2024-05-01T10:00:00Z".into()),
            ..Default::default()
        };
        assert!(config.uptime_at(Utc::now()).is_none());
    }

    #[test]
    fn uptime_is_none_for_unparseable_timestamp() {
        let config = ContainerConfig {
            running: true,
            started_at: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(config.uptime_at(Utc::now()).is_none());
    }

    #[test]
    fn display_name_strips_leading_slash() {
        let config = ContainerConfig {
            name: "/web".into(),
            ..Default::default()
        };
        assert_eq!(config.display_name(), "web");
    }
}
