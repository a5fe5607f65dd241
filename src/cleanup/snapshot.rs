// Read-only usage overview shown before cleanup

use crate::format::to_gb;
use crate::gateway::{ContainerFilter, Gateway};
use crate::models::{ContainerCounts, ImageCounts, NetworkCounts, ResourceSnapshot};
use std::io::Write;
use tracing::warn;

/// Each listing is independent; a failure leaves that section empty and
/// never blocks the cleanup.
pub async fn take_snapshot(gateway: &dyn Gateway) -> ResourceSnapshot {
    let containers = match gateway.list_containers(ContainerFilter::everything()).await {
        Ok(c) => Some(ContainerCounts::from_summaries(&c)),
        Err(e) => {
            warn!(error = %e, operation = "list_containers", "usage snapshot incomplete");
            None
        }
    };
    let images = match gateway.list_images().await {
        Ok(i) => Some(ImageCounts::from_summaries(&i)),
        Err(e) => {
            warn!(error = %e, operation = "list_images", "usage snapshot incomplete");
            None
        }
    };
    let networks = match gateway.list_networks().await {
        Ok(n) => Some(NetworkCounts::from_summaries(&n)),
        Err(e) => {
            warn!(error = %e, operation = "list_networks", "usage snapshot incomplete");
            None
        }
    };
    let volumes = match gateway.list_volumes().await {
        Ok(v) => Some(v.len() as u64),
        Err(e) => {
            warn!(error = %e, operation = "list_volumes", "usage snapshot incomplete");
            None
        }
    };
    ResourceSnapshot {
        containers,
        images,
        networks,
        volumes,
    }
}

pub fn render_snapshot<W: Write>(snapshot: &ResourceSnapshot, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Current usage:")?;
    if let Some(c) = snapshot.containers {
        writeln!(
            out,
            "   Containers: {} total ({} running, {} stopped)",
            c.total, c.running, c.stopped
        )?;
    }
    if let Some(i) = snapshot.images {
        writeln!(
            out,
            "   Images: {} total ({} dangling), {:.2} GB",
            i.total,
            i.dangling,
            to_gb(i.size)
        )?;
    }
    if let Some(n) = snapshot.networks {
        writeln!(out, "   Networks: {} total ({} custom)", n.total, n.custom)?;
    }
    if let Some(v) = snapshot.volumes {
        writeln!(out, "   Volumes: {}", v)?;
    }
    writeln!(out)
}
