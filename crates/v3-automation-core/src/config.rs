use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{DEFAULT_DECIMAL_PRECISION, DEFAULT_LIMIT_ORDER_WIDTH_MULTIPLIER, MIN_DECIMAL_PRECISION};
use crate::errors::{AutomationError, CoreResult};
use crate::math::decimal::{rounding_mode_serde, DecimalContext, RoundingMode};

/// Core configuration loaded from a TOML file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CoreConfig {
    /// Decimal math settings
    pub decimal: DecimalConfig,

    /// Limit order range settings
    pub limit_order: LimitOrderConfig,
}

/// Decimal math settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DecimalConfig {
    /// Significant digits kept by inexact operations
    pub precision: u64,

    /// Rounding applied at the working precision
    #[serde(with = "rounding_mode_serde")]
    pub rounding: RoundingMode,
}

/// Limit order range settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitOrderConfig {
    /// Range width in tick spacings
    pub width_multiplier: u32,
}

impl CoreConfig {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AutomationError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let config: CoreConfig = toml::from_str(content)
            .map_err(|e| AutomationError::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| AutomationError::config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content).map_err(|e| {
            AutomationError::config(format!("Failed to write config file {}: {}", path.display(), e))
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.decimal.precision < MIN_DECIMAL_PRECISION {
            return Err(AutomationError::config(format!(
                "decimal.precision must be at least {}, got {}",
                MIN_DECIMAL_PRECISION, self.decimal.precision
            )));
        }
        if self.limit_order.width_multiplier == 0 {
            return Err(AutomationError::config("limit_order.width_multiplier must be greater than 0"));
        }
        Ok(())
    }

    /// Decimal context for the configured precision and rounding
    pub fn decimal_context(&self) -> CoreResult<DecimalContext> {
        DecimalContext::new(self.decimal.precision, self.decimal.rounding)
    }
}

impl Default for DecimalConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_DECIMAL_PRECISION,
            rounding: RoundingMode::HalfUp,
        }
    }
}

impl Default for LimitOrderConfig {
    fn default() -> Self {
        Self {
            width_multiplier: DEFAULT_LIMIT_ORDER_WIDTH_MULTIPLIER,
        }
    }
}
