// Engine information and disk usage for `clear --info`

use crate::format::{rule, to_gb};
use crate::gateway::Gateway;
use std::io::Write;
use tracing::warn;

/// Display only. An engine-info failure ends the report; a disk-usage failure
/// only drops the disk lines.
pub async fn report_system_info<W: Write>(gateway: &dyn Gateway, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Fetching Docker system information...")?;

    let info = match gateway.system_info().await {
        Ok(info) => info,
        Err(e) => {
            warn!(error = %e, operation = "system_info", "system info unavailable");
            return writeln!(out, "Error: failed to get system info: {}", e);
        }
    };

    writeln!(out, "{}", rule('='))?;
    writeln!(out, "Docker system information:")?;
    writeln!(out, "   Version: {}", info.version)?;
    writeln!(
        out,
        "   Containers: {} total ({} running, {} paused, {} stopped)",
        info.containers, info.running, info.paused, info.stopped
    )?;
    writeln!(out, "   Images: {}", info.images)?;
    writeln!(out, "   Storage driver: {}", info.storage_driver)?;
    writeln!(out, "   Root directory: {}", info.root_dir)?;

    match gateway.disk_usage().await {
        Ok(usage) => {
            writeln!(out, "   Disk usage: {:.2} GB", to_gb(usage.total()))?;
            writeln!(out, "     Layers: {:.2} GB", to_gb(usage.layers_size))?;
            writeln!(out, "     Build cache: {:.2} GB", to_gb(usage.build_cache_size))?;
        }
        Err(e) => {
            warn!(error = %e, operation = "disk_usage", "disk usage unavailable");
        }
    }

    writeln!(
        out,
        "   System time: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}
