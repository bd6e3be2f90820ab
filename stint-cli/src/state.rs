use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use stint_core::{Schedule, Task};

/// `$STINT_HOME`, else `~/.stint`.
pub fn stint_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("STINT_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".stint"))
}

pub fn ensure_stint_home() -> Result<PathBuf> {
    let dir = stint_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn tasks_path() -> Result<PathBuf> {
    Ok(ensure_stint_home()?.join("tasks.json"))
}

pub fn schedule_path() -> Result<PathBuf> {
    Ok(ensure_stint_home()?.join("schedule.json"))
}

fn read_json<T: DeserializeOwned>(p: &Path) -> Result<T> {
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

fn write_json<T: Serialize>(p: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn read_tasks() -> Result<Vec<Task>> {
    let p = tasks_path()?;
    if !p.exists() {
        return Ok(Vec::new());
    }
    read_json(&p)
}

pub fn write_tasks(tasks: &[Task]) -> Result<()> {
    write_json(&tasks_path()?, &tasks)
}

pub fn read_schedule() -> Result<Option<Schedule>> {
    let p = schedule_path()?;
    if !p.exists() {
        return Ok(None);
    }
    read_json(&p).map(Some)
}

pub fn write_schedule(schedule: &Schedule) -> Result<()> {
    write_json(&schedule_path()?, schedule)
}
