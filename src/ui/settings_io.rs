use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use log::{info, warn};

use crate::ui::settings::AppSettings;

fn settings_path() -> anyhow::Result<PathBuf> {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("noir_files");
    fs::create_dir_all(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    path.push("settings.json");
    Ok(path)
}

/// Missing or unreadable settings are not an error; defaults are used.
pub fn load_settings() -> AppSettings {
    let Ok(path) = settings_path() else {
        return AppSettings::default();
    };

    match fs::read_to_string(&path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
            warn!("ignoring malformed {}: {}", path.display(), e);
            AppSettings::default()
        }),
        Err(_) => AppSettings::default(),
    }
}

pub fn save_settings(settings: &AppSettings) -> anyhow::Result<()> {
    let path = settings_path()?;
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    info!("settings saved to {}", path.display());
    Ok(())
}
