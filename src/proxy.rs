// Registry mirror setup for the local Docker engine.
//
// Linux engines keep their settings in /etc/docker/daemon.json and restart
// through systemd; OrbStack on macOS uses ~/.orbstack/config/docker.json and
// restarts through orbctl.

use anyhow::{Context, bail};
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

pub const DEFAULT_MIRRORS: [&str; 2] = ["https://docker.1ms.run", "https://docker.1panel.live"];

const MIRRORS_KEY: &str = "registry-mirrors";
const DAEMON_JSON: &str = "/etc/docker/daemon.json";

/// Why an existing `registry-mirrors` value was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    Missing,
    Null,
    NotAnArray,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorChange {
    Reset(ResetReason),
    Added(String),
    AlreadyPresent(String),
}

/// Appends each of `mirrors` to the config's `registry-mirrors` list unless
/// it is already there. A missing, null, non-array or empty value starts
/// from an empty list. Other keys are left untouched.
pub fn merge_registry_mirrors(config: &mut Map<String, Value>, mirrors: &[&str]) -> Vec<MirrorChange> {
    let mut changes = Vec::new();
    let mut list = match config.remove(MIRRORS_KEY) {
        None => {
            changes.push(MirrorChange::Reset(ResetReason::Missing));
            Vec::new()
        }
        Some(Value::Null) => {
            changes.push(MirrorChange::Reset(ResetReason::Null));
            Vec::new()
        }
        Some(Value::Array(items)) if items.is_empty() => {
            changes.push(MirrorChange::Reset(ResetReason::Empty));
            Vec::new()
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            changes.push(MirrorChange::Reset(ResetReason::NotAnArray));
            Vec::new()
        }
    };

    for mirror in mirrors {
        if list.iter().any(|existing| existing.as_str() == Some(*mirror)) {
            changes.push(MirrorChange::AlreadyPresent(mirror.to_string()));
        } else {
            list.push(Value::String(mirror.to_string()));
            changes.push(MirrorChange::Added(mirror.to_string()));
        }
    }
    config.insert(MIRRORS_KEY.to_string(), Value::Array(list));
    changes
}

pub fn render_changes<W: Write>(changes: &[MirrorChange], out: &mut W) -> std::io::Result<()> {
    for change in changes {
        match change {
            MirrorChange::Reset(ResetReason::Missing) => {
                writeln!(out, "   no registry mirrors configured yet")?
            }
            MirrorChange::Reset(ResetReason::Null) => {
                writeln!(out, "   registry-mirrors is null, starting a new list")?
            }
            MirrorChange::Reset(ResetReason::NotAnArray) => {
                writeln!(out, "   registry-mirrors is not a list, replacing it")?
            }
            MirrorChange::Reset(ResetReason::Empty) => {
                writeln!(out, "   registry-mirrors is empty, starting a new list")?
            }
            MirrorChange::Added(m) => writeln!(out, "   added mirror {}", m)?,
            MirrorChange::AlreadyPresent(m) => writeln!(out, "   mirror {} already configured", m)?,
        }
    }
    Ok(())
}

/// Reads the engine config at `path`, merges `mirrors` into it and writes it
/// back pretty-printed.
pub fn update_config_file(path: &Path, mirrors: &[&str]) -> anyhow::Result<Vec<MirrorChange>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading engine config {}", path.display()))?;
    let mut config: Map<String, Value> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing engine config {}", path.display()))?;

    let changes = merge_registry_mirrors(&mut config, mirrors);

    let updated = serde_json::to_string_pretty(&config).context("serializing engine config")?;
    std::fs::write(path, updated)
        .with_context(|| format!("writing engine config {}", path.display()))?;
    Ok(changes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// dockerd managed by systemd.
    Systemd,
    OrbStack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    pub kind: EngineKind,
    pub config_path: PathBuf,
}

impl ProxyTarget {
    pub fn detect() -> anyhow::Result<Self> {
        if cfg!(target_os = "linux") {
            Ok(Self {
                kind: EngineKind::Systemd,
                config_path: PathBuf::from(DAEMON_JSON),
            })
        } else if cfg!(target_os = "macos") {
            let home = std::env::var("HOME").context("HOME is not set")?;
            Ok(Self {
                kind: EngineKind::OrbStack,
                config_path: PathBuf::from(home).join(".orbstack/config/docker.json"),
            })
        } else {
            bail!("registry mirror setup is only supported on Linux and macOS")
        }
    }
}

/// Runs `program` and returns its trimmed stdout; a non-zero exit is an error.
async fn run_tool(program: &str, args: &[&str]) -> anyhow::Result<String> {
    debug!(program, ?args, "running");
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .with_context(|| format!("running {} {}", program, args.join(" ")))?;
    if !output.status.success() {
        bail!(
            "{} {} exited with {}: {}",
            program,
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

async fn check_engine<W: Write>(kind: EngineKind, out: &mut W) -> anyhow::Result<()> {
    match kind {
        EngineKind::Systemd => {
            run_tool("docker", &["version"])
                .await
                .context("Docker is not installed")?;
            // is-active exits non-zero for a stopped unit; only the text matters.
            let status = Command::new("systemctl")
                .args(["is-active", "docker"])
                .output()
                .await
                .context("checking docker service status")?;
            if String::from_utf8_lossy(&status.stdout).trim() == "active" {
                writeln!(out, "Docker service is running")?;
            } else {
                writeln!(out, "Docker service is not running")?;
            }
        }
        EngineKind::OrbStack => {
            run_tool("orbctl", &["version"])
                .await
                .context("OrbStack is not installed")?;
            match run_tool("orbctl", &["status"]).await {
                Ok(status) => writeln!(out, "OrbStack status: {}", status)?,
                Err(e) => {
                    debug!(error = %e, operation = "orbctl_status", "status unavailable");
                    writeln!(out, "OrbStack status: Stopped")?
                }
            }
        }
    }
    Ok(())
}

async fn restart_engine(kind: EngineKind) -> anyhow::Result<()> {
    match kind {
        EngineKind::Systemd => {
            run_tool("systemctl", &["daemon-reload"])
                .await
                .context("reloading systemd units")?;
            run_tool("systemctl", &["restart", "docker"])
                .await
                .context("restarting Docker")?;
        }
        EngineKind::OrbStack => {
            run_tool("orbctl", &["restart", "docker"])
                .await
                .context("restarting OrbStack Docker engine")?;
        }
    }
    Ok(())
}

/// Checks the engine is installed, merges `mirrors` into its config and
/// restarts it so the mirrors take effect.
pub async fn configure_mirrors<W: Write>(
    target: &ProxyTarget,
    mirrors: &[&str],
    out: &mut W,
) -> anyhow::Result<()> {
    check_engine(target.kind, out).await?;

    writeln!(out, "Updating {}", target.config_path.display())?;
    let changes = update_config_file(&target.config_path, mirrors)?;
    render_changes(&changes, out)?;

    writeln!(out, "Restarting Docker...")?;
    out.flush()?;
    restart_engine(target.kind).await?;
    info!(path = %target.config_path.display(), "registry mirrors configured");
    writeln!(out, "Registry mirrors configured.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            other => panic!("not an object: {}", other),
        }
    }

    #[test]
    fn missing_key_gets_defaults() {
        let mut config = object(json!({ "debug": true }));
        let changes = merge_registry_mirrors(&mut config, &DEFAULT_MIRRORS);
        assert_eq!(changes[0], MirrorChange::Reset(ResetReason::Missing));
        assert_eq!(config[MIRRORS_KEY], json!(DEFAULT_MIRRORS));
        assert_eq!(config["debug"], json!(true));
    }

    #[test]
    fn null_value_is_replaced() {
        let mut config = object(json!({ "registry-mirrors": null }));
        let changes = merge_registry_mirrors(&mut config, &["https://a"]);
        assert_eq!(
            changes,
            vec![
                MirrorChange::Reset(ResetReason::Null),
                MirrorChange::Added("https://a".into())
            ]
        );
        assert_eq!(config[MIRRORS_KEY], json!(["https://a"]));
    }

    #[test]
    fn wrongly_typed_value_is_replaced() {
        let mut config = object(json!({ "registry-mirrors": "https://old" }));
        let changes = merge_registry_mirrors(&mut config, &["https://a"]);
        assert_eq!(changes[0], MirrorChange::Reset(ResetReason::NotAnArray));
        assert_eq!(config[MIRRORS_KEY], json!(["https://a"]));
    }

    #[test]
    fn empty_list_is_refilled() {
        let mut config = object(json!({ "registry-mirrors": [] }));
        let changes = merge_registry_mirrors(&mut config, &["https://a"]);
        assert_eq!(changes[0], MirrorChange::Reset(ResetReason::Empty));
        assert_eq!(config[MIRRORS_KEY], json!(["https://a"]));
    }

    #[test]
    fn existing_mirrors_are_kept_and_not_duplicated() {
        let mut config = object(json!({ "registry-mirrors": ["https://mine", "https://a"] }));
        let changes = merge_registry_mirrors(&mut config, &["https://a", "https://b"]);
        assert_eq!(
            changes,
            vec![
                MirrorChange::AlreadyPresent("https://a".into()),
                MirrorChange::Added("https://b".into())
            ]
        );
        assert_eq!(
            config[MIRRORS_KEY],
            json!(["https://mine", "https://a", "https://b"])
        );
    }

    #[test]
    fn render_lists_each_change() {
        let mut out = Vec::new();
        render_changes(
            &[
                MirrorChange::Reset(ResetReason::Missing),
                MirrorChange::Added("https://a".into()),
                MirrorChange::AlreadyPresent("https://b".into()),
            ],
            &mut out,
        )
        .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("no registry mirrors configured yet"));
        assert!(out.contains("added mirror https://a"));
        assert!(out.contains("mirror https://b already configured"));
    }
}
