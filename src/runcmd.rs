// Rebuilds a `docker run` invocation from an inspected container

use crate::format::binary_size;
use crate::models::ContainerConfig;
use std::fmt::Write;

const NANOS_PER_CPU: f64 = 1_000_000_000.0;

/// Produces a `docker run` command line that recreates `config` as closely as
/// the inspect data allows. Ports appear in container-port order and only the
/// first binding of each port is considered.
pub fn generate_run_command(config: &ContainerConfig) -> String {
    let mut cmd = String::from("docker run");

    if !config.name.is_empty() {
        let _ = write!(cmd, " --name {} -d", config.name.replace('/', ""));
    }

    let mut previous_port: Option<&str> = None;
    for binding in &config.port_bindings {
        if previous_port == Some(binding.container_port.as_str()) {
            continue;
        }
        previous_port = Some(binding.container_port.as_str());
        if binding.host_port.is_empty() {
            continue;
        }
        let port = binding
            .container_port
            .split('/')
            .next()
            .unwrap_or(&binding.container_port);
        let _ = write!(cmd, " -p {}:{}", binding.host_port, port);
    }

    for m in &config.mounts {
        let _ = write!(cmd, " -v {}:{}", m.source, m.destination);
    }

    for d in &config.devices {
        let _ = write!(cmd, " --device {}:{}", d.path_on_host, d.path_in_container);
    }

    if config.nano_cpus > 0 {
        let _ = write!(cmd, " --cpus={:.6}", config.nano_cpus as f64 / NANOS_PER_CPU);
    }

    if config.memory_bytes > 0 {
        let _ = write!(cmd, " --memory={}", binary_size(config.memory_bytes as u64));
    }

    if !config.restart_policy.is_empty() {
        let _ = write!(cmd, " --restart {}", config.restart_policy);
    }

    if !config.network_mode.is_empty() {
        let _ = write!(cmd, " --network {}", config.network_mode);
    }

    if !config.image.is_empty() {
        let _ = write!(cmd, " {}", config.image);
    }

    cmd
}
