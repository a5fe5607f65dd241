// Reclaims stopped containers and unused images, networks and volumes.
// Stages run strictly in sequence; a failed stage is reported and the next
// one still runs.

mod confirm;
mod snapshot;
mod system_info;

pub use confirm::{confirm_cleanup, is_affirmative};
pub use snapshot::{render_snapshot, take_snapshot};
pub use system_info::report_system_info;

use crate::format::{rule, to_mb};
use crate::gateway::{ContainerFilter, Gateway};
use crate::models::{CleanupStats, short_id};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Prune every unused image instead of only dangling ones.
    pub include_all_images: bool,
    pub skip_confirmation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    Completed(CleanupStats),
    /// The user declined; nothing was removed.
    Cancelled,
}

pub struct Orchestrator {
    gateway: Arc<dyn Gateway>,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Runs the full pipeline: usage snapshot, confirmation, then the four
    /// removal stages. Only write failures on `out` surface as errors.
    #[instrument(skip_all, fields(operation = "perform_cleanup", include_all_images = options.include_all_images))]
    pub async fn perform_cleanup<R, W>(
        &self,
        options: CleanupOptions,
        input: &mut R,
        out: &mut W,
    ) -> anyhow::Result<CleanupOutcome>
    where
        R: BufRead,
        W: Write,
    {
        writeln!(out, "Starting Docker cleanup...")?;
        writeln!(out, "{}", rule('='))?;

        let snapshot = take_snapshot(self.gateway.as_ref()).await;
        render_snapshot(&snapshot, out)?;

        if !options.skip_confirmation && !confirm_cleanup(options.include_all_images, input, out)? {
            writeln!(out, "Cleanup cancelled.")?;
            info!("cleanup declined by user");
            return Ok(CleanupOutcome::Cancelled);
        }

        writeln!(out)?;
        writeln!(out, "Cleaning up...")?;

        let mut stats = CleanupStats::default();
        self.remove_stopped_containers(&mut stats, out).await?;
        self.prune_images(options.include_all_images, &mut stats, out)
            .await?;
        self.prune_networks(&mut stats, out).await?;
        self.prune_volumes(&mut stats, out).await?;

        render_results(&stats, out)?;
        info!(
            containers = stats.containers_removed,
            images = stats.images_removed,
            networks = stats.networks_removed,
            volumes = stats.volumes_removed,
            space_reclaimed = stats.space_reclaimed,
            "cleanup finished"
        );
        Ok(CleanupOutcome::Completed(stats))
    }

    async fn remove_stopped_containers<W: Write>(
        &self,
        stats: &mut CleanupStats,
        out: &mut W,
    ) -> std::io::Result<()> {
        write!(out, "Removing stopped containers... ")?;
        out.flush()?;

        let containers = match self
            .gateway
            .list_containers(ContainerFilter::reclaimable())
            .await
        {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, operation = "list_containers", "container stage skipped");
                writeln!(out, "failed to list containers: {}", e)?;
                return Ok(());
            }
        };

        let mut removed = 0;
        let mut failures = Vec::new();
        // The engine's status filter decides; the parsed state is informational.
        for c in &containers {
            if !c.state.is_reclaimable() {
                debug!(container = %c.id, state = %c.state, "engine listed container as stopped");
            }
            match self.gateway.remove_container(&c.id).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!(error = %e, operation = "remove_container", container = %c.id, "removal failed");
                    failures.push(format!(
                        "   failed to remove container {}: {}",
                        short_id(&c.id),
                        e
                    ));
                }
            }
        }
        stats.containers_removed += removed;

        writeln!(out, "{} removed", removed)?;
        for line in failures {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    async fn prune_images<W: Write>(
        &self,
        include_all: bool,
        stats: &mut CleanupStats,
        out: &mut W,
    ) -> std::io::Result<()> {
        if include_all {
            write!(out, "Removing unused images... ")?;
        } else {
            write!(out, "Removing dangling images... ")?;
        }
        out.flush()?;

        match self.gateway.prune_images(!include_all).await {
            Ok(report) => {
                stats.images_removed += report.removed;
                stats.space_reclaimed += report.space_reclaimed;
                writeln!(
                    out,
                    "{} removed, {:.2} MB reclaimed",
                    report.removed,
                    to_mb(report.space_reclaimed)
                )
            }
            Err(e) => {
                warn!(error = %e, operation = "prune_images", "image stage skipped");
                writeln!(out, "failed to prune images: {}", e)
            }
        }
    }

    async fn prune_networks<W: Write>(
        &self,
        stats: &mut CleanupStats,
        out: &mut W,
    ) -> std::io::Result<()> {
        write!(out, "Removing unused networks... ")?;
        out.flush()?;

        match self.gateway.prune_networks().await {
            Ok(report) => {
                stats.networks_removed += report.removed;
                writeln!(out, "{} removed", report.removed)
            }
            Err(e) => {
                warn!(error = %e, operation = "prune_networks", "network stage skipped");
                writeln!(out, "failed to prune networks: {}", e)
            }
        }
    }

    async fn prune_volumes<W: Write>(
        &self,
        stats: &mut CleanupStats,
        out: &mut W,
    ) -> std::io::Result<()> {
        write!(out, "Removing unused volumes... ")?;
        out.flush()?;

        match self.gateway.prune_volumes().await {
            Ok(report) => {
                stats.volumes_removed += report.removed;
                stats.space_reclaimed += report.space_reclaimed;
                writeln!(
                    out,
                    "{} removed, {:.2} MB reclaimed",
                    report.removed,
                    to_mb(report.space_reclaimed)
                )
            }
            Err(e) => {
                warn!(error = %e, operation = "prune_volumes", "volume stage skipped");
                writeln!(out, "failed to prune volumes: {}", e)
            }
        }
    }
}

pub fn render_results<W: Write>(stats: &CleanupStats, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", rule('='))?;
    writeln!(out, "Cleanup complete")?;
    writeln!(out, "Summary:")?;
    writeln!(out, "   Containers removed: {}", stats.containers_removed)?;
    writeln!(out, "   Images removed:     {}", stats.images_removed)?;
    writeln!(out, "   Networks removed:   {}", stats.networks_removed)?;
    writeln!(out, "   Volumes removed:    {}", stats.volumes_removed)?;
    writeln!(
        out,
        "   Space reclaimed:    {:.2} MB",
        to_mb(stats.space_reclaimed)
    )?;
    if stats.is_empty() {
        writeln!(out, "Docker is already clean, nothing to remove.")?;
    }
    Ok(())
}
