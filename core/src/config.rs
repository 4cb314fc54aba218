// core/src/config.rs
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::climbs::ClimbParams;
use crate::merge::MergeOptions;
use crate::pacing::PacingOptions;
use crate::recovery::RecoveryParams;

/// Every tunable of the engine in one place. Missing sections and fields
/// fall back to their defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub climbs: ClimbParams,
    pub pacing: PacingOptions,
    pub merge: MergeOptions,
    pub recovery: RecoveryParams,
}

/// Reads settings from a JSON file. A missing file gives the defaults.
pub fn load_settings(path: impl AsRef<Path>) -> anyhow::Result<AnalysisSettings> {
    let path = path.as_ref();
    if !path.exists() {
        log::info!("no settings at {}, using defaults", path.display());
        return Ok(AnalysisSettings::default());
    }

    let contents = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let settings: AnalysisSettings =
        serde_json::from_str(&contents).with_context(|| format!("parsing settings in {}", path.display()))?;
    log::info!(
        "settings loaded from {} (min climb gain {} m, naismith={})",
        path.display(),
        settings.climbs.min_gain,
        settings.pacing.use_naismith
    );
    Ok(settings)
}

/// Writes settings as pretty-printed JSON.
pub fn save_settings(settings: &AnalysisSettings, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    log::info!("settings saved to {}", path.display());
    Ok(())
}
