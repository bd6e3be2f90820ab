use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use stint_core::{AllocationDefaults, TimeOfDay, Window};

use crate::state::ensure_stint_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleSection,
    #[serde(default)]
    pub reminders: RemindersSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSection {
    pub default_chunk_minutes: u32,
    /// 0 disables nags unless a task overrides it.
    pub default_nag_minutes: u32,
    pub window_start: TimeOfDay,
    pub window_end: TimeOfDay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersSection {
    pub enabled: bool,
    /// Upper bound on how long `watch` sleeps before re-reading the schedule,
    /// so edits made from another shell are picked up.
    pub poll_seconds: u64,
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            default_chunk_minutes: 30,
            default_nag_minutes: 10,
            window_start: TimeOfDay::from_hm(9, 0).unwrap_or(TimeOfDay::MIDNIGHT),
            window_end: TimeOfDay::from_hm(17, 0).unwrap_or(TimeOfDay::END_OF_DAY),
        }
    }
}

impl Default for RemindersSection {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_seconds: 30,
        }
    }
}

impl ScheduleSection {
    pub fn window(&self) -> Result<Window> {
        Window::new(self.window_start, self.window_end).context("config [schedule] window")
    }

    pub fn defaults(&self) -> AllocationDefaults {
        AllocationDefaults {
            chunk_minutes: self.default_chunk_minutes,
            nag_interval_minutes: self.default_nag_minutes,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_stint_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(s.contains("window_start = \"09:00\""));
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.schedule.default_chunk_minutes, 30);
        assert!(back.reminders.enabled);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.schedule.window().unwrap().length_minutes(), 8 * 60);
        assert_eq!(cfg.schedule.defaults().nag_interval_minutes, 10);
    }
}
