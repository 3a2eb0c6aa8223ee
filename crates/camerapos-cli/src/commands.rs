//! Subcommand implementations

use anyhow::{anyhow, bail, Context, Result};
use camerapos_core::{CameraPose, JsonPoseStore, LevelKey, Location, PoseStore, Rotation};
use camerapos_editor::{load_config, save_default_config};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Open the store named by the settings file, or `store_override` if given
pub fn open_store(config_path: &Path, store_override: Option<&Path>) -> Result<JsonPoseStore> {
    let path = match store_override {
        Some(path) => path.to_path_buf(),
        None => {
            let config = load_config(config_path)
                .with_context(|| format!("Failed to load {}", config_path.display()))?;
            config.store_path(config_path)
        }
    };
    info!(store = %path.display(), "Opening camera position store");
    Ok(JsonPoseStore::open(path))
}

fn level_key(level: &str) -> Result<LevelKey> {
    LevelKey::from_level_path(level).ok_or_else(|| anyhow!("Level path is empty"))
}

pub fn pose_from_args(location: &[f64], rotation: Option<&[f64]>, fov: Option<f64>) -> Result<CameraPose> {
    let [x, y, z] = location else {
        bail!("Location needs exactly three values");
    };
    let rotation = match rotation {
        Some([pitch, yaw, roll]) => Rotation::new(*pitch, *yaw, *roll),
        Some(_) => bail!("Rotation needs exactly three values"),
        None => Rotation::default(),
    };

    let pose = CameraPose::new(Location::new(*x, *y, *z), rotation);
    Ok(match fov {
        Some(fov) => pose.with_fov(fov),
        None => pose,
    })
}

pub fn list(store: &impl PoseStore, out: &mut impl Write) -> Result<()> {
    let keys = store.keys();
    if keys.is_empty() {
        writeln!(out, "No camera positions saved")?;
        return Ok(());
    }

    for key in keys {
        if let Some(entry) = store.entry(&key) {
            writeln!(
                out,
                "{}  {}  (saved {})",
                key,
                entry.pose,
                entry.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
            )?;
        }
    }
    Ok(())
}

pub fn show(store: &impl PoseStore, level: &str, out: &mut impl Write) -> Result<()> {
    let key = level_key(level)?;
    let Some(entry) = store.entry(&key) else {
        writeln!(out, "No camera position saved for {}", key)?;
        return Ok(());
    };

    let pose = entry.pose;
    writeln!(out, "Level:    {}", key)?;
    writeln!(out, "Location: {}", pose.location.to_clipboard_string())?;
    writeln!(
        out,
        "Rotation: P={:.3} Y={:.3} R={:.3}",
        pose.rotation.pitch, pose.rotation.yaw, pose.rotation.roll
    )?;
    if let Some(fov) = pose.fov {
        writeln!(out, "FOV:      {:.3}", fov)?;
    }
    writeln!(out, "Saved:    {}", entry.saved_at.to_rfc3339())?;
    Ok(())
}

pub fn set(store: &mut impl PoseStore, level: &str, pose: CameraPose, out: &mut impl Write) -> Result<()> {
    let key = level_key(level)?;
    store
        .put(&key, pose)
        .with_context(|| format!("Failed to save camera position for {}", key))?;
    writeln!(out, "Saved {}  {}", key, pose)?;
    Ok(())
}

pub fn erase(store: &mut impl PoseStore, level: &str, out: &mut impl Write) -> Result<()> {
    let key = level_key(level)?;
    let erased = store
        .erase(&key)
        .with_context(|| format!("Failed to erase camera position for {}", key))?;
    if erased {
        writeln!(out, "Erased {}", key)?;
    } else {
        writeln!(out, "No camera position saved for {}", key)?;
    }
    Ok(())
}

pub fn init_config(path: &Path, force: bool, out: &mut impl Write) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists, pass --force to overwrite", path.display());
    }
    save_default_config(path).with_context(|| format!("Failed to write {}", path.display()))?;
    writeln!(out, "Wrote {}", path.display())?;
    Ok(())
}
