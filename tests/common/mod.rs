// Shared test helpers: an in-memory gateway that records every call and a
// terminal that captures everything written to it.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use doke::frame::{StreamKind, encode_frame};
use doke::gateway::{ContainerFilter, Gateway, GatewayError, LogOptions, LogStream};
use doke::inspect::Terminal;
use doke::models::*;
use futures_util::StreamExt;
use futures_util::stream;
use std::collections::{HashSet, VecDeque};
use std::io::Write;
use std::sync::{Arc, Mutex};

pub fn engine_failure(operation: &'static str) -> GatewayError {
    GatewayError::Engine {
        operation,
        source: bollard::errors::Error::DockerResponseServerError {
            status_code: 500,
            message: "boom".into(),
        },
    }
}

pub fn container(id: &str, name: &str, state: ContainerState) -> ContainerSummary {
    ContainerSummary {
        id: id.into(),
        names: vec![format!("/{}", name)],
        image: "alpine".into(),
        state,
    }
}

pub fn image(id: &str, tags: &[&str], size: u64) -> ImageSummary {
    ImageSummary {
        id: id.into(),
        repo_tags: tags.iter().map(|t| t.to_string()).collect(),
        size,
    }
}

pub fn stdout_chunk(text: &str) -> Bytes {
    encode_frame(StreamKind::Stdout, text.as_bytes())
}

#[derive(Default)]
pub struct RecordingGateway {
    pub containers: Vec<ContainerSummary>,
    pub images: Vec<ImageSummary>,
    pub networks: Vec<NetworkSummary>,
    pub volumes: Vec<VolumeSummary>,
    pub image_prune: PruneReport,
    pub network_prune: PruneReport,
    pub volume_prune: PruneReport,
    pub config: Option<ContainerConfig>,
    pub engine: EngineInfo,
    pub disk: DiskUsage,
    /// Returned for any state-filtered listing regardless of their parsed state.
    pub engine_matched: Vec<ContainerSummary>,
    /// Container ids whose removal fails.
    pub fail_removal: HashSet<String>,
    /// Operation names that fail outright.
    pub failing: HashSet<&'static str>,
    /// Consumed in order; an exhausted queue yields a default sample.
    pub samples: Mutex<VecDeque<Result<TelemetrySample, GatewayError>>>,
    pub log_chunks: Vec<Bytes>,
    /// Yield a read error after this many chunks; later chunks still follow it.
    pub log_error_after: Option<usize>,
    /// Keep the log stream open after the scripted chunks.
    pub hold_logs_open: bool,
    pub calls: Mutex<Vec<String>>,
}

impl RecordingGateway {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Calls that change engine state.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("remove_") || c.starts_with("prune_"))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, operation: &'static str) -> Result<(), GatewayError> {
        if self.failing.contains(operation) {
            return Err(engine_failure(operation));
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    async fn list_containers(
        &self,
        filter: ContainerFilter,
    ) -> Result<Vec<ContainerSummary>, GatewayError> {
        self.record(format!("list_containers:{:?}", filter.states));
        self.check("list_containers")?;
        let mut listed: Vec<ContainerSummary> = self
            .containers
            .iter()
            .filter(|c| filter.states.is_empty() || filter.states.contains(&c.state))
            .cloned()
            .collect();
        if !filter.states.is_empty() {
            listed.extend(self.engine_matched.iter().cloned());
        }
        Ok(listed)
    }

    async fn remove_container(&self, id: &str) -> Result<(), GatewayError> {
        self.record(format!("remove_container:{}", id));
        if self.fail_removal.contains(id) {
            return Err(engine_failure("remove_container"));
        }
        Ok(())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerConfig, GatewayError> {
        self.record(format!("inspect_container:{}", id));
        self.check("inspect_container")?;
        self.config
            .clone()
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))
    }

    async fn list_images(&self) -> Result<Vec<ImageSummary>, GatewayError> {
        self.record("list_images".into());
        self.check("list_images")?;
        Ok(self.images.clone())
    }

    async fn list_networks(&self) -> Result<Vec<NetworkSummary>, GatewayError> {
        self.record("list_networks".into());
        self.check("list_networks")?;
        Ok(self.networks.clone())
    }

    async fn list_volumes(&self) -> Result<Vec<VolumeSummary>, GatewayError> {
        self.record("list_volumes".into());
        self.check("list_volumes")?;
        Ok(self.volumes.clone())
    }

    async fn prune_images(&self, dangling_only: bool) -> Result<PruneReport, GatewayError> {
        self.record(format!("prune_images:dangling_only={}", dangling_only));
        self.check("prune_images")?;
        Ok(self.image_prune)
    }

    async fn prune_networks(&self) -> Result<PruneReport, GatewayError> {
        self.record("prune_networks".into());
        self.check("prune_networks")?;
        Ok(self.network_prune)
    }

    async fn prune_volumes(&self) -> Result<PruneReport, GatewayError> {
        self.record("prune_volumes".into());
        self.check("prune_volumes")?;
        Ok(self.volume_prune)
    }

    async fn stats_snapshot(&self, id: &str) -> Result<TelemetrySample, GatewayError> {
        self.record(format!("stats_snapshot:{}", id));
        self.samples
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(TelemetrySample::default()))
    }

    async fn stream_logs(&self, id: &str, options: LogOptions) -> Result<LogStream, GatewayError> {
        self.record(format!("stream_logs:{}:tail={}", id, options.tail));
        self.check("stream_logs")?;
        let mut items: Vec<Result<Bytes, GatewayError>> =
            self.log_chunks.iter().cloned().map(Ok).collect();
        if let Some(n) = self.log_error_after {
            items.insert(n.min(items.len()), Err(engine_failure("read_logs")));
        }
        let chunks = stream::iter(items);
        if self.hold_logs_open {
            Ok(chunks.chain(stream::pending()).boxed())
        } else {
            Ok(chunks.boxed())
        }
    }

    async fn system_info(&self) -> Result<EngineInfo, GatewayError> {
        self.record("system_info".into());
        self.check("system_info")?;
        Ok(self.engine.clone())
    }

    async fn disk_usage(&self) -> Result<DiskUsage, GatewayError> {
        self.record("disk_usage".into());
        self.check("disk_usage")?;
        Ok(self.disk.clone())
    }
}

/// Terminal whose writers all append to one shared buffer.
#[derive(Clone, Default)]
pub struct CaptureTerminal {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CaptureTerminal {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }
}

impl Terminal for CaptureTerminal {
    fn writer(&self) -> Box<dyn Write + Send> {
        Box::new(SharedWriter(self.buf.clone()))
    }
}

pub struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl Write for SharedWriter {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
