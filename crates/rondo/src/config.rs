use derive_more::{AsRef, Deref, Display, From, Into};
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rondo_wheel::WheelParams;
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

/// Sentinel exec value for the seeded first-run item: committing it opens
/// the config file instead of spawning a command.
pub const SETUP_EXEC: &str = "RONDO_SETUP";

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ItemLabel(String);

crate::impl_string_newtype!(ItemLabel);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct IconName(String);

crate::impl_string_newtype!(IconName);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ExecCommand(String);

crate::impl_string_newtype!(ExecCommand);

/// Preset feel for drag sensitivity and release inertia.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SpinProfile {
    #[strum(serialize = "smooth", serialize = "default")]
    Smooth,
    #[strum(serialize = "snappy", serialize = "fast")]
    Snappy,
    #[strum(serialize = "heavy", serialize = "slow")]
    Heavy,
}

impl SpinProfile {
    pub fn base_params(&self) -> WheelParams {
        match self {
            Self::Smooth => WheelParams::default(),
            Self::Snappy => WheelParams {
                sensitivity: 0.1,
                damping: 0.90,
                ..WheelParams::default()
            },
            Self::Heavy => WheelParams {
                sensitivity: 0.03,
                damping: 0.97,
                sample_interval_ms: 100,
                ..WheelParams::default()
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct WheelConfig {
    #[serde(default)]
    pub profile: Option<SpinProfile>,
    pub sensitivity: Option<f64>,
    pub damping: Option<f64>,
    pub sample_interval_ms: Option<u64>,
    /// Append a synthetic trailing slot that opens the config file.
    #[serde(default)]
    pub overflow: bool,
}

impl WheelConfig {
    /// Profile presets, then explicit overrides on top.
    pub fn params(&self) -> Result<WheelParams, ConfigError> {
        let mut params = self.profile.unwrap_or(SpinProfile::Smooth).base_params();
        if let Some(sensitivity) = self.sensitivity {
            params.sensitivity = sensitivity;
        }
        if let Some(damping) = self.damping {
            params.damping = damping;
        }
        if let Some(interval) = self.sample_interval_ms {
            params.sample_interval_ms = interval;
        }
        params.validate()?;
        Ok(params)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItemConfig {
    pub label: ItemLabel,
    pub icon: Option<IconName>,
    pub exec: Option<ExecCommand>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub wheel: WheelConfig,
    #[serde(default)]
    pub items: Vec<ItemConfig>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Wheel parameter error: {0}")]
    Params(#[from] rondo_wheel::ParamError),
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "rondo", "rondo").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("RONDO"))
        .build()?;

    Ok(s.try_deserialize()?)
}

fn setup_config() -> Config {
    Config {
        wheel: WheelConfig::default(),
        items: vec![ItemConfig {
            label: ItemLabel::new("Setup"),
            icon: Some(IconName::new("preferences-system")),
            exec: Some(ExecCommand::new(SETUP_EXEC)),
        }],
    }
}

pub fn load_or_setup() -> Config {
    if let Ok(path) = get_config_path()
        && !path.exists()
    {
        return setup_config();
    }

    match load_config() {
        Ok(c) if !c.items.is_empty() => c,
        Ok(_) => setup_config(),
        Err(e) => {
            log::error!("Failed to load config: {}", e);
            setup_config()
        }
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_deserialization() {
        let cases = vec![
            ("\"smooth\"", SpinProfile::Smooth),
            ("\"Smooth\"", SpinProfile::Smooth),
            ("\"SMOOTH\"", SpinProfile::Smooth),
            ("\"default\"", SpinProfile::Smooth),
            ("\"snappy\"", SpinProfile::Snappy),
            ("\"fast\"", SpinProfile::Snappy),
            ("\"heavy\"", SpinProfile::Heavy),
            ("\"slow\"", SpinProfile::Heavy),
        ];

        for (json, expected) in cases {
            let deserialized: SpinProfile = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
    }

    #[test]
    fn test_explicit_values_override_profile() {
        let cfg = WheelConfig {
            profile: Some(SpinProfile::Heavy),
            sensitivity: Some(0.08),
            damping: None,
            sample_interval_ms: None,
            overflow: false,
        };
        let params = cfg.params().unwrap();
        assert_eq!(params.sensitivity, 0.08);
        assert_eq!(params.damping, 0.97);
        assert_eq!(params.sample_interval_ms, 100);
    }

    #[test]
    fn test_invalid_damping_is_rejected() {
        let cfg = WheelConfig {
            damping: Some(1.5),
            ..WheelConfig::default()
        };
        assert!(matches!(cfg.params(), Err(ConfigError::Params(_))));
    }

    #[test]
    fn test_default_config_file_parses() {
        let parsed = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let cfg: Config = parsed.try_deserialize().unwrap();
        assert!(!cfg.items.is_empty());
        assert!(cfg.wheel.params().is_ok());
    }
}
