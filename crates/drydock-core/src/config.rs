use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::layout::{default_data_root, SiteLayout};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConfig {
    #[serde(default = "config_file_version")]
    pub version: u32,
    #[serde(default)]
    pub repo_url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_lock_ttl_secs")]
    pub lock_ttl_secs: u64,
    #[serde(default = "default_db_name")]
    pub db_name: String,
    #[serde(default = "default_service")]
    pub service: String,
    #[serde(default = "default_supervisor_program")]
    pub supervisor_program: String,
    #[serde(default)]
    pub data_dir: String,
    #[serde(default)]
    pub db_dump_command: Vec<String>,
    #[serde(default)]
    pub db_restore_command: Vec<String>,
    #[serde(default)]
    pub migrate_command: Vec<String>,
    #[serde(default)]
    pub restart_command: Vec<String>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            version: config_file_version(),
            repo_url: String::new(),
            branch: default_branch(),
            lock_ttl_secs: default_lock_ttl_secs(),
            db_name: default_db_name(),
            service: default_service(),
            supervisor_program: default_supervisor_program(),
            data_dir: String::new(),
            db_dump_command: Vec::new(),
            db_restore_command: Vec::new(),
            migrate_command: Vec::new(),
            restart_command: Vec::new(),
        }
    }
}

impl UpdateConfig {
    pub fn config_path(site_root: &Path) -> PathBuf {
        site_root.join("drydock.toml")
    }

    pub fn load(site_root: &Path) -> Result<Self> {
        let path = Self::config_path(site_root);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("failed parsing config: {}", path.display()))?;
        config.version = config_file_version();
        Ok(config)
    }

    pub fn save(&self, site_root: &Path) -> Result<()> {
        let path = Self::config_path(site_root);
        let content = toml::to_string(self)
            .with_context(|| format!("failed serializing config: {}", path.display()))?;
        fs::write(&path, content)
            .with_context(|| format!("failed writing config: {}", path.display()))
    }

    pub fn resolve_layout(&self, site_root: &Path) -> SiteLayout {
        let data_root = if self.data_dir.is_empty() {
            default_data_root(site_root)
        } else {
            PathBuf::from(&self.data_dir)
        };
        SiteLayout::new(site_root, data_root)
    }

    pub fn require_repo_url(&self) -> Result<&str> {
        if self.repo_url.is_empty() {
            anyhow::bail!("config-incomplete: repo_url is not set in drydock.toml");
        }
        Ok(&self.repo_url)
    }

    pub fn dump_command(&self) -> Vec<String> {
        if !self.db_dump_command.is_empty() {
            return self.db_dump_command.clone();
        }
        vec![
            "mysqldump".to_string(),
            "--single-transaction".to_string(),
            self.db_name.clone(),
        ]
    }

    pub fn restore_command(&self) -> Vec<String> {
        if !self.db_restore_command.is_empty() {
            return self.db_restore_command.clone();
        }
        vec!["mysql".to_string(), self.db_name.clone()]
    }

    pub fn migrate_command_line(&self) -> Vec<String> {
        if !self.migrate_command.is_empty() {
            return self.migrate_command.clone();
        }
        vec![
            "php".to_string(),
            "artisan".to_string(),
            "migrate".to_string(),
            "--force".to_string(),
        ]
    }

    pub fn restart_command_line(&self) -> Vec<String> {
        if !self.restart_command.is_empty() {
            return self.restart_command.clone();
        }
        vec![
            self.supervisor_program.clone(),
            "restart".to_string(),
            self.service.clone(),
        ]
    }

    pub fn dump_tool(&self) -> String {
        self.dump_command()
            .into_iter()
            .next()
            .unwrap_or_else(|| "mysqldump".to_string())
    }

    pub fn supervisor_tool(&self) -> String {
        self.restart_command_line()
            .into_iter()
            .next()
            .unwrap_or_else(default_supervisor_program)
    }
}

fn config_file_version() -> u32 {
    1
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_lock_ttl_secs() -> u64 {
    1800
}

fn default_db_name() -> String {
    "catalog".to_string()
}

fn default_service() -> String {
    "catalog-site".to_string()
}

fn default_supervisor_program() -> String {
    "supervisorctl".to_string()
}
