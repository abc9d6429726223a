use anyhow::{anyhow, Context, Result};
use asteroid_planner_core::constants::MAX_HORIZON;
use asteroid_planner_core::{EmptyFieldPolicy, PlannerConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutopilotConfig {
    pub id: String,
    pub description: String,

    #[serde(default)]
    pub planner: PlannerConfig,

    // Live game endpoint
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    // Headless runs: frames between planner calls (the last action is held
    // in between) and lives per game.
    #[serde(default = "default_decision_interval")]
    pub decision_interval: u32,
    #[serde(default = "default_lives")]
    pub lives: u32,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_decision_interval() -> u32 {
    4
}

fn default_lives() -> u32 {
    1
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            id: "lookahead-h10".to_string(),
            description: "Ten-layer (1.5 s) clearance search, one life.".to_string(),
            planner: PlannerConfig::default(),
            host: default_host(),
            port: default_port(),
            decision_interval: default_decision_interval(),
            lives: default_lives(),
        }
    }
}

impl AutopilotConfig {
    pub const PRESETS: [&'static str; 4] = ["default", "quick", "deep", "open-field"];

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "quick" => Some(Self {
                id: "lookahead-h6".to_string(),
                description: "Shallow 0.9 s search, replans every frame.".to_string(),
                planner: PlannerConfig {
                    horizon: 6,
                    ..PlannerConfig::default()
                },
                decision_interval: 1,
                ..Self::default()
            }),
            "deep" => Some(Self {
                id: "lookahead-h12".to_string(),
                description: "Deepest supported search (1.8 s), replans less often.".to_string(),
                planner: PlannerConfig {
                    horizon: MAX_HORIZON,
                    ..PlannerConfig::default()
                },
                decision_interval: 8,
                ..Self::default()
            }),
            "open-field" => Some(Self {
                id: "lookahead-h10-open".to_string(),
                description: "Default search; an empty field counts as unlimited clearance."
                    .to_string(),
                planner: PlannerConfig {
                    empty_field: EmptyFieldPolicy::Unconstrained,
                    ..PlannerConfig::default()
                },
                ..Self::default()
            }),
            _ => None,
        }
    }

    pub fn clamp(&mut self) {
        self.planner.horizon = self.planner.horizon.min(MAX_HORIZON);
        self.decision_interval = self.decision_interval.clamp(1, 60);
        self.lives = self.lives.clamp(1, 9);
    }

    /// `AUTOPILOT_HOST`, `AUTOPILOT_PORT` and `AUTOPILOT_HORIZON` override
    /// whatever the file or preset said.
    pub fn apply_env(&mut self) {
        if let Ok(host) = env::var("AUTOPILOT_HOST") {
            if !host.trim().is_empty() {
                self.host = host.trim().to_string();
            }
        }
        self.port = read_env_u16("AUTOPILOT_PORT", self.port);
        self.planner.horizon = read_env_usize_allow_zero("AUTOPILOT_HORIZON", self.planner.horizon);
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn load_config(path: Option<&Path>, preset: Option<&str>) -> Result<AutopilotConfig> {
    let mut cfg = if let Some(path) = path {
        let data = std::fs::read(path)
            .with_context(|| format!("failed reading config {}", path.display()))?;
        serde_json::from_slice::<AutopilotConfig>(&data)
            .with_context(|| format!("invalid config {}", path.display()))?
    } else if let Some(name) = preset {
        AutopilotConfig::preset(name).ok_or_else(|| {
            anyhow!(
                "unknown preset '{}' (try: {})",
                name,
                AutopilotConfig::PRESETS.join(", ")
            )
        })?
    } else {
        AutopilotConfig::default()
    };
    cfg.apply_env();
    cfg.clamp();
    Ok(cfg)
}

pub(crate) fn read_env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

pub(crate) fn read_env_usize_allow_zero(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn every_listed_preset_exists_and_validates() {
        for name in AutopilotConfig::PRESETS {
            let cfg = AutopilotConfig::preset(name).expect("listed preset");
            cfg.planner.validate().expect("preset planner config");
        }
        assert!(AutopilotConfig::preset("nope").is_none());
    }

    #[test]
    fn clamp_bounds_fields() {
        let mut cfg = AutopilotConfig {
            decision_interval: 0,
            lives: 40,
            ..AutopilotConfig::default()
        };
        cfg.planner.horizon = 50;
        cfg.clamp();
        assert_eq!(cfg.planner.horizon, MAX_HORIZON);
        assert_eq!(cfg.decision_interval, 1);
        assert_eq!(cfg.lives, 9);
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let cfg: AutopilotConfig =
            serde_json::from_str(r#"{"id": "x", "description": "y"}"#).unwrap();
        assert_eq!(cfg.planner, PlannerConfig::default());
        assert_eq!(cfg.endpoint(), "127.0.0.1:5000");
        assert_eq!(cfg.decision_interval, 4);
    }

    #[test]
    fn loads_config_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"{{"id": "file-cfg", "description": "", "planner": {{"horizon": 7}}, "port": 6001}}"#
        )?;
        let cfg = load_config(Some(file.path()), None)?;
        assert_eq!(cfg.id, "file-cfg");
        assert_eq!(cfg.planner.horizon, 7);
        assert_eq!(cfg.port, 6001);
        Ok(())
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let err = load_config(None, Some("warp-drive")).unwrap_err();
        assert!(err.to_string().contains("unknown preset"));
    }
}
