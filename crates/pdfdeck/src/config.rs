use anyhow::Result;
use pdfdeck::{PrevPolicy, Surfaces};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "pdfdeck";

pub const KEYS: &[&str] = &[
    "navigation.prev_policy",
    "defaults.start_slide",
    "defaults.surfaces",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<NavigationConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_policy: Option<PrevPolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// 1-indexed logical slide
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_slide: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surfaces: Option<SurfacesSetting>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfacesSetting {
    Single,
    #[default]
    Dual,
}

impl From<SurfacesSetting> for Surfaces {
    fn from(setting: SurfacesSetting) -> Self {
        match setting {
            SurfacesSetting::Single => Surfaces::Single,
            SurfacesSetting::Dual => Surfaces::Dual,
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `pdfdeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Using default config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# pdfdeck configuration - https://github.com/mklab-se/pdfdeck\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn prev_policy(&self) -> PrevPolicy {
        self.navigation
            .as_ref()
            .and_then(|n| n.prev_policy)
            .unwrap_or_default()
    }

    pub fn start_slide(&self) -> Option<usize> {
        self.defaults.as_ref().and_then(|d| d.start_slide)
    }

    pub fn surfaces(&self) -> Surfaces {
        self.defaults
            .as_ref()
            .and_then(|d| d.surfaces)
            .unwrap_or_default()
            .into()
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "navigation.prev_policy" => {
                let Some(policy) = PrevPolicy::from_name(value) else {
                    anyhow::bail!(
                        "Invalid prev_policy: {value}. Must be 'rewind-group' or 'previous-group'."
                    );
                };
                self.navigation
                    .get_or_insert_with(NavigationConfig::default)
                    .prev_policy = Some(policy);
            }
            "defaults.start_slide" => {
                let slide = match value.parse::<usize>() {
                    Ok(n) if n >= 1 => n,
                    _ => anyhow::bail!(
                        "Invalid start_slide: {value}. Must be a slide number (1 or more)."
                    ),
                };
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .start_slide = Some(slide);
            }
            "defaults.surfaces" => {
                let surfaces = match value {
                    "single" => SurfacesSetting::Single,
                    "dual" => SurfacesSetting::Dual,
                    _ => anyhow::bail!("Invalid surfaces: {value}. Must be 'single' or 'dual'."),
                };
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .surfaces = Some(surfaces);
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: {}",
                KEYS.join(", ")
            ),
        }
        Ok(())
    }
}
