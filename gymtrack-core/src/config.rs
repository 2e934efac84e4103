use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Centralized configuration for the gymtrack service
///
/// Every section is optional in the file; missing values take defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GymConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub sessions: SessionSection,
    pub pagination: PaginationSection,
    pub catalog: CatalogSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: SocketAddr,
    pub cors_permissive: bool,
    /// IANA timezone used for day and month boundaries
    pub timezone: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/gymtrack".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub ttl_minutes: i64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self { ttl_minutes: 480 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationSection {
    pub history_page_size: usize,
    pub equipment_page_size: usize,
}

impl Default for PaginationSection {
    fn default() -> Self {
        Self {
            history_page_size: 20,
            equipment_page_size: 10,
        }
    }
}

/// Branches members check into and the equipment items inspected there
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    pub branches: Vec<String>,
    pub equipment: Vec<String>,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            branches: vec!["Main Campus".to_string(), "North Campus".to_string()],
            equipment: [
                "Treadmill",
                "Stationary bike",
                "Elliptical",
                "Rowing machine",
                "Bench press",
                "Squat rack",
                "Dumbbells",
                "Kettlebells",
                "Cable machine",
                "Yoga mats",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl CatalogSection {
    pub fn has_branch(&self, branch: &str) -> bool {
        self.branches.iter().any(|b| b == branch)
    }

    pub fn has_equipment(&self, item: &str) -> bool {
        self.equipment.iter().any(|e| e == item)
    }
}

impl GymConfig {
    /// Load config from `$GYMTRACK_CONFIG` or ~/.gymtrack/config.toml.
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path, falling back to defaults when absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            Self::from_toml(&content)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML content (without environment overrides).
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file (invalid TOML)")
    }

    /// Get config file path: `$GYMTRACK_CONFIG` or ~/.gymtrack/config.toml
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var("GYMTRACK_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gymtrack/config.toml")
    }

    /// Environment overrides (DATABASE_URL, GYMTRACK_TIMEZONE)
    fn apply_env(&mut self) {
        if let Ok(url) = env::var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(tz) = env::var("GYMTRACK_TIMEZONE") {
            self.server.timezone = tz;
        }
    }

    /// Check values the service cannot run without.
    pub fn validate(&self) -> Result<()> {
        self.timezone()?;
        if self.pagination.history_page_size == 0 || self.pagination.equipment_page_size == 0 {
            anyhow::bail!("pagination page sizes must be positive");
        }
        if self.sessions.ttl_minutes <= 0 {
            anyhow::bail!("sessions.ttl_minutes must be positive");
        }
        if self.catalog.branches.is_empty() {
            anyhow::bail!("catalog.branches must list at least one branch");
        }
        if self.catalog.equipment.is_empty() {
            anyhow::bail!("catalog.equipment must list at least one item");
        }
        Ok(())
    }

    /// Configured timezone.
    pub fn timezone(&self) -> Result<Tz> {
        self.server
            .timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", self.server.timezone, e))
    }

    /// Render as TOML (for `gymtrack config show` / `init`).
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let config = GymConfig::default();
        config.validate().unwrap();
        assert_eq!(config.server.bind.port(), 3030);
        assert_eq!(config.pagination.history_page_size, 20);
        assert!(config.catalog.has_branch("Main Campus"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = GymConfig::from_toml(
            r#"
            [server]
            timezone = "America/Bogota"

            [catalog]
            branches = ["Downtown"]
            "#,
        )
        .unwrap();

        assert_eq!(config.server.timezone, "America/Bogota");
        assert_eq!(config.server.bind.port(), 3030);
        assert_eq!(config.catalog.branches, vec!["Downtown"]);
        assert!(!config.catalog.equipment.is_empty());
        assert_eq!(config.timezone().unwrap(), chrono_tz::America::Bogota);
    }

    #[test]
    fn rejects_bad_timezone() {
        let config = GymConfig::from_toml("[server]\ntimezone = \"Mars/Olympus\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_catalog() {
        let config = GymConfig::from_toml("[catalog]\nbranches = []\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("branches"));
    }

    #[test]
    fn load_from_file_and_round_trip() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[pagination]\nhistory_page_size = 50").unwrap();

        let config = GymConfig::load_from(file.path()).unwrap();
        assert_eq!(config.pagination.history_page_size, 50);

        let rendered = config.to_toml().unwrap();
        let reparsed = GymConfig::from_toml(&rendered).unwrap();
        assert_eq!(reparsed.pagination.history_page_size, 50);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GymConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.pagination.equipment_page_size, 10);
    }
}
