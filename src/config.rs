use crate::error::{CropCareError, Result};
use dialoguer::Input;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Non-medicine cost rates for treatment estimates.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PricingConfig {
    /// Flat sprayer rental
    #[serde(default = "default_equipment_base")]
    pub equipment_base: f64,
    #[serde(default = "default_equipment_per_acre")]
    pub equipment_per_acre: f64,
    /// Hired application labor
    #[serde(default = "default_labor_per_acre")]
    pub labor_per_acre: f64,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_equipment_base() -> f64 {
    200.0
}

fn default_equipment_per_acre() -> f64 {
    50.0
}

fn default_labor_per_acre() -> f64 {
    150.0
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            equipment_base: default_equipment_base(),
            equipment_per_acre: default_equipment_per_acre(),
            labor_per_acre: default_labor_per_acre(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl PricingConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("equipment_base", self.equipment_base),
            ("equipment_per_acre", self.equipment_per_acre),
            ("labor_per_acre", self.labor_per_acre),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CropCareError::Config(format!(
                    "pricing.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file; defaults to the data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Rejects paths still holding a `${VAR}` placeholder whose variable was unset.
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.path {
            if path.to_string_lossy().contains("${") {
                return Err(CropCareError::Config(format!(
                    "database.path {} references an unset environment variable",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

impl Config {
    pub fn load(config_override: Option<&PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => {
                if !p.exists() {
                    return Err(CropCareError::Config(format!(
                        "Config file not found at {:?}",
                        p
                    )));
                }
                p.clone()
            }
            None => match Self::find_config_path() {
                Some(p) => p,
                None => {
                    tracing::info!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| CropCareError::Config(format!("Failed to read config: {}", e)))?;

        let config = Self::from_yaml(&config_str)?;
        tracing::debug!(path = %config_path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // Substitute environment variables
        let content = Self::substitute_env_vars(content);

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| CropCareError::Config(format!("Failed to parse config: {}", e)))?;
        config.pricing.validate()?;
        config.database.validate()?;

        Ok(config)
    }

    /// Search for config.yaml in standard locations.
    fn find_config_path() -> Option<PathBuf> {
        // Try current directory first
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        // Try XDG config directory
        dirs::config_dir()
            .map(|dir| dir.join("cropcare").join("config.yaml"))
            .filter(|p| p.exists())
    }

    /// Default path for writing new config files (~/.config/cropcare/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CropCareError::Config("Cannot determine config directory".into()))?
            .join("cropcare");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the new Config and the path it was written to.
    pub fn setup_interactive(config_override: Option<&PathBuf>) -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up CropCare!");
        println!();

        println!("Treatment cost rates");
        let defaults = PricingConfig::default();

        let equipment_base: f64 = Input::new()
            .with_prompt("  Sprayer rental, flat")
            .default(defaults.equipment_base)
            .interact_text()
            .map_err(|e| CropCareError::Config(format!("Input error: {}", e)))?;

        let equipment_per_acre: f64 = Input::new()
            .with_prompt("  Sprayer rental, per acre")
            .default(defaults.equipment_per_acre)
            .interact_text()
            .map_err(|e| CropCareError::Config(format!("Input error: {}", e)))?;

        let labor_per_acre: f64 = Input::new()
            .with_prompt("  Application labor, per acre")
            .default(defaults.labor_per_acre)
            .interact_text()
            .map_err(|e| CropCareError::Config(format!("Input error: {}", e)))?;

        let currency_symbol: String = Input::new()
            .with_prompt("  Currency symbol")
            .default(defaults.currency_symbol)
            .interact_text()
            .map_err(|e| CropCareError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Knowledge base (leave blank for the default location)");
        let db_path: String = Input::new()
            .with_prompt("  SQLite file")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| CropCareError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            pricing: PricingConfig {
                equipment_base,
                equipment_per_acre,
                labor_per_acre,
                currency_symbol,
            },
            database: DatabaseConfig {
                path: if db_path.trim().is_empty() {
                    None
                } else {
                    Some(PathBuf::from(db_path.trim()))
                },
            },
        };
        config.pricing.validate()?;

        let config_path = match config_override {
            Some(p) => p.clone(),
            None => Self::default_config_path()?,
        };
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| CropCareError::Config(format!("Failed to serialize config: {}", e)))?;

        // Write with a header comment
        let content = format!(
            "# CropCare Configuration\n# Generated by `cropcare init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        // CLI override takes priority
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        // Then check env var
        if let Ok(dir) = std::env::var("CROPCARE_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        // Use XDG data directory
        let data_dir = dirs::data_dir()
            .ok_or_else(|| CropCareError::Config("Cannot determine data directory".into()))?
            .join("cropcare");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    /// SQLite location: --data-dir, then the config file, then the data directory.
    pub fn db_path(&self, data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        if data_dir_override.is_none() {
            if let Some(path) = &self.database.path {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                return Ok(path.clone());
            }
        }
        Ok(Self::data_dir(data_dir_override)?.join("cropcare.db"))
    }
}
