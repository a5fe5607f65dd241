// Gateway over the Docker Engine API via bollard

use super::{ContainerFilter, Gateway, GatewayError, LogOptions, LogStream, decode_stats};
use crate::config::DockerConfig;
use crate::frame::{StreamKind, encode_frame};
use crate::models::{
    ContainerConfig, ContainerState, ContainerSummary, DeviceMapping, DiskUsage, EngineInfo,
    ImageSummary, MountPoint, NetworkSummary, PortBinding, PruneReport, TelemetrySample,
    VolumeSummary,
};
use async_trait::async_trait;
use bollard::container::LogOutput;
use bollard::query_parameters::{
    DataUsageOptions, InspectContainerOptions, ListContainersOptions, ListImagesOptions,
    ListNetworksOptions, ListVolumesOptions, LogsOptions, PruneImagesOptions,
    PruneNetworksOptions, PruneVolumesOptions, RemoveContainerOptions, StatsOptions,
};
use bollard::secret::ContainerInspectResponse;
use bollard::{API_DEFAULT_VERSION, Docker};
use bytes::Bytes;
use futures_util::StreamExt;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

pub struct DockerGateway {
    docker: Docker,
}

impl DockerGateway {
    /// Builds the client. The daemon is not contacted until the first call.
    pub fn connect(config: &DockerConfig) -> Result<Self, GatewayError> {
        let docker = match config.host.as_deref() {
            Some(socket) => {
                Docker::connect_with_unix(socket, config.timeout_secs, API_DEFAULT_VERSION)
            }
            None => Docker::connect_with_local_defaults()
                .map(|d| d.with_timeout(Duration::from_secs(config.timeout_secs))),
        }
        .map_err(GatewayError::Connect)?;
        Ok(Self { docker })
    }
}

fn non_negative(v: i64) -> u64 {
    v.max(0) as u64
}

fn log_frame(output: LogOutput) -> Bytes {
    match output {
        LogOutput::StdIn { message } => encode_frame(StreamKind::Stdin, &message),
        LogOutput::StdOut { message } => encode_frame(StreamKind::Stdout, &message),
        LogOutput::StdErr { message } => encode_frame(StreamKind::Stderr, &message),
        // TTY containers have no framing on the wire; present them as stdout.
        LogOutput::Console { message } => encode_frame(StreamKind::Stdout, &message),
    }
}

fn container_config(r: ContainerInspectResponse) -> ContainerConfig {
    let state = r.state.as_ref();
    let host = r.host_config.as_ref();

    let mut port_bindings: Vec<PortBinding> = host
        .and_then(|h| h.port_bindings.as_ref())
        .map(|ports| {
            ports
                .iter()
                .flat_map(|(port, bindings)| {
                    bindings.iter().flatten().map(move |b| PortBinding {
                        container_port: port.clone(),
                        host_ip: b.host_ip.clone().unwrap_or_default(),
                        host_port: b.host_port.clone().unwrap_or_default(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    // Stable, so bindings of one port keep their engine order.
    port_bindings.sort_by(|a, b| a.container_port.cmp(&b.container_port));

    let mounts = r
        .mounts
        .as_ref()
        .map(|mounts| {
            mounts
                .iter()
                .map(|m| MountPoint {
                    kind: m.typ.as_ref().map(|t| t.to_string()).unwrap_or_default(),
                    source: m.source.clone().unwrap_or_default(),
                    destination: m.destination.clone().unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();

    let devices = host
        .and_then(|h| h.devices.as_ref())
        .map(|devices| {
            devices
                .iter()
                .map(|d| DeviceMapping {
                    path_on_host: d.path_on_host.clone().unwrap_or_default(),
                    path_in_container: d.path_in_container.clone().unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();

    ContainerConfig {
        id: r.id.clone().unwrap_or_default(),
        name: r.name.clone().unwrap_or_default(),
        image: r
            .config
            .as_ref()
            .and_then(|c| c.image.clone())
            .unwrap_or_default(),
        status: state
            .and_then(|s| s.status.as_ref())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        running: state.and_then(|s| s.running).unwrap_or(false),
        started_at: state.and_then(|s| s.started_at.clone()),
        port_bindings,
        mounts,
        devices,
        nano_cpus: host.and_then(|h| h.nano_cpus).unwrap_or(0),
        memory_bytes: host.and_then(|h| h.memory).unwrap_or(0),
        restart_policy: host
            .and_then(|h| h.restart_policy.as_ref())
            .and_then(|p| p.name.as_ref())
            .map(|n| n.to_string())
            .unwrap_or_default(),
        network_mode: host
            .and_then(|h| h.network_mode.clone())
            .unwrap_or_default(),
    }
}

#[async_trait]
impl Gateway for DockerGateway {
    #[instrument(skip(self), fields(gateway = "docker", operation = "list_containers"))]
    async fn list_containers(
        &self,
        filter: ContainerFilter,
    ) -> Result<Vec<ContainerSummary>, GatewayError> {
        let mut filters = HashMap::new();
        if !filter.states.is_empty() {
            filters.insert(
                "status".to_string(),
                filter.states.iter().map(|s| s.as_str().to_string()).collect(),
            );
        }
        let options = ListContainersOptions {
            all: filter.all,
            filters: Some(filters),
            ..Default::default()
        };
        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(GatewayError::engine("list_containers"))?;

        Ok(containers
            .into_iter()
            .map(|c| ContainerSummary {
                id: c.id.clone().unwrap_or_default(),
                names: c.names.clone().unwrap_or_default(),
                image: c.image.clone().unwrap_or_default(),
                state: c
                    .state
                    .as_ref()
                    .map(|s| ContainerState::from_docker(&s.to_string()))
                    .unwrap_or(ContainerState::Unknown),
            })
            .collect())
    }

    #[instrument(skip(self), fields(gateway = "docker", operation = "remove_container"))]
    async fn remove_container(&self, id: &str) -> Result<(), GatewayError> {
        self.docker
            .remove_container(id, Some(RemoveContainerOptions::default()))
            .await
            .map_err(GatewayError::engine("remove_container"))
    }

    #[instrument(skip(self), fields(gateway = "docker", operation = "inspect_container"))]
    async fn inspect_container(&self, id: &str) -> Result<ContainerConfig, GatewayError> {
        let response = self
            .docker
            .inspect_container(id, Some(InspectContainerOptions::default()))
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => GatewayError::NotFound(id.to_string()),
                source => GatewayError::Engine {
                    operation: "inspect_container",
                    source,
                },
            })?;
        Ok(container_config(response))
    }

    #[instrument(skip(self), fields(gateway = "docker", operation = "list_images"))]
    async fn list_images(&self) -> Result<Vec<ImageSummary>, GatewayError> {
        let images = self
            .docker
            .list_images(Some(ListImagesOptions::default()))
            .await
            .map_err(GatewayError::engine("list_images"))?;
        Ok(images
            .into_iter()
            .map(|i| ImageSummary {
                id: i.id,
                repo_tags: i.repo_tags,
                size: non_negative(i.size),
            })
            .collect())
    }

    #[instrument(skip(self), fields(gateway = "docker", operation = "list_networks"))]
    async fn list_networks(&self) -> Result<Vec<NetworkSummary>, GatewayError> {
        let networks = self
            .docker
            .list_networks(Some(ListNetworksOptions::default()))
            .await
            .map_err(GatewayError::engine("list_networks"))?;
        Ok(networks
            .into_iter()
            .map(|n| NetworkSummary {
                name: n.name.unwrap_or_default(),
            })
            .collect())
    }

    #[instrument(skip(self), fields(gateway = "docker", operation = "list_volumes"))]
    async fn list_volumes(&self) -> Result<Vec<VolumeSummary>, GatewayError> {
        let response = self
            .docker
            .list_volumes(Some(ListVolumesOptions::default()))
            .await
            .map_err(GatewayError::engine("list_volumes"))?;
        Ok(response
            .volumes
            .unwrap_or_default()
            .into_iter()
            .map(|v| VolumeSummary { name: v.name })
            .collect())
    }

    #[instrument(skip(self), fields(gateway = "docker", operation = "prune_images"))]
    async fn prune_images(&self, dangling_only: bool) -> Result<PruneReport, GatewayError> {
        // dangling=false widens the prune to every image without a container.
        let mut filters = HashMap::new();
        filters.insert("dangling".to_string(), vec![dangling_only.to_string()]);
        let response = self
            .docker
            .prune_images(Some(PruneImagesOptions {
                filters: Some(filters),
                ..Default::default()
            }))
            .await
            .map_err(GatewayError::engine("prune_images"))?;
        Ok(PruneReport {
            removed: response.images_deleted.map_or(0, |d| d.len() as u64),
            space_reclaimed: response.space_reclaimed.map_or(0, non_negative),
        })
    }

    #[instrument(skip(self), fields(gateway = "docker", operation = "prune_networks"))]
    async fn prune_networks(&self) -> Result<PruneReport, GatewayError> {
        let response = self
            .docker
            .prune_networks(Some(PruneNetworksOptions::default()))
            .await
            .map_err(GatewayError::engine("prune_networks"))?;
        Ok(PruneReport {
            removed: response.networks_deleted.map_or(0, |d| d.len() as u64),
            space_reclaimed: 0,
        })
    }

    #[instrument(skip(self), fields(gateway = "docker", operation = "prune_volumes"))]
    async fn prune_volumes(&self) -> Result<PruneReport, GatewayError> {
        let response = self
            .docker
            .prune_volumes(Some(PruneVolumesOptions::default()))
            .await
            .map_err(GatewayError::engine("prune_volumes"))?;
        Ok(PruneReport {
            removed: response.volumes_deleted.map_or(0, |d| d.len() as u64),
            space_reclaimed: response.space_reclaimed.map_or(0, non_negative),
        })
    }

    #[instrument(skip(self), fields(gateway = "docker", operation = "stats_snapshot"))]
    async fn stats_snapshot(&self, id: &str) -> Result<TelemetrySample, GatewayError> {
        let options = StatsOptions {
            stream: false,
            ..Default::default()
        };
        let mut stream = self.docker.stats(id, Some(options));
        let response = stream
            .next()
            .await
            .ok_or_else(|| GatewayError::Decode {
                operation: "stats_snapshot",
                reason: "empty stats response".to_string(),
            })?
            .map_err(GatewayError::engine("stats_snapshot"))?;
        decode_stats(&response)
    }

    #[instrument(skip(self), fields(gateway = "docker", operation = "stream_logs"))]
    async fn stream_logs(&self, id: &str, options: LogOptions) -> Result<LogStream, GatewayError> {
        let options = LogsOptions {
            follow: options.follow,
            stdout: options.stdout,
            stderr: options.stderr,
            timestamps: options.timestamps,
            tail: options.tail.to_string(),
            ..Default::default()
        };
        debug!(container = id, "opening log stream");
        let stream = self
            .docker
            .logs(id, Some(options))
            .map(|item| item.map(log_frame).map_err(GatewayError::engine("read_logs")));
        Ok(stream.boxed())
    }

    #[instrument(skip(self), fields(gateway = "docker", operation = "system_info"))]
    async fn system_info(&self) -> Result<EngineInfo, GatewayError> {
        let info = self
            .docker
            .info()
            .await
            .map_err(GatewayError::engine("system_info"))?;
        Ok(EngineInfo {
            version: info.server_version.unwrap_or_default(),
            containers: info.containers.map_or(0, non_negative),
            running: info.containers_running.map_or(0, non_negative),
            paused: info.containers_paused.map_or(0, non_negative),
            stopped: info.containers_stopped.map_or(0, non_negative),
            images: info.images.map_or(0, non_negative),
            storage_driver: info.driver.unwrap_or_default(),
            root_dir: info.docker_root_dir.unwrap_or_default(),
        })
    }

    #[instrument(skip(self), fields(gateway = "docker", operation = "disk_usage"))]
    async fn disk_usage(&self) -> Result<DiskUsage, GatewayError> {
        let usage = self
            .docker
            .df(None::<DataUsageOptions>)
            .await
            .map_err(GatewayError::engine("disk_usage"))?;
        Ok(DiskUsage {
            layers_size: usage.layers_size.map_or(0, non_negative),
            images_size: usage
                .images
                .unwrap_or_default()
                .iter()
                .map(|i| non_negative(i.size))
                .sum(),
            volumes_size: usage
                .volumes
                .unwrap_or_default()
                .iter()
                .filter_map(|v| v.usage_data.as_ref())
                .map(|u| non_negative(u.size))
                .sum(),
            build_cache_size: usage
                .build_cache
                .unwrap_or_default()
                .iter()
                .filter_map(|b| b.size)
                .map(non_negative)
                .sum(),
        })
    }
}
