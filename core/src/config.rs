use crate::{
    persistence::{JsonFileBackend, RecordBackend, SqliteBackend},
    query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    simulation::{DEFAULT_ITERATIONS, DEFAULT_VOLATILITY},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    pub default_iterations: usize,
    pub default_volatility: f64,
    /// Hard cap on caller-supplied iteration counts.
    pub max_iterations:     usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_iterations: DEFAULT_ITERATIONS,
            default_volatility: DEFAULT_VOLATILITY,
            max_iterations:     100_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationConfig {
    pub default_page_size: usize,
    pub max_page_size:     usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size:     MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskConfig {
    /// None disables persistence entirely.
    pub persist_path: Option<String>,
    pub backend:      BackendKind,
    pub debounce_ms:  u64,
    pub simulation:   SimulationConfig,
    pub pagination:   PaginationConfig,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            persist_path: None,
            backend:      BackendKind::Json,
            debounce_ms:  1000,
            simulation:   SimulationConfig::default(),
            pagination:   PaginationConfig::default(),
        }
    }
}

impl RiskConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    /// In tests, use RiskConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: RiskConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.check()?;
        Ok(config)
    }

    /// Defaults overlaid with PERSIST_PATH and RISK_BACKEND.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> anyhow::Result<Self> {
        if let Ok(path) = std::env::var("PERSIST_PATH") {
            if !path.is_empty() {
                self.persist_path = Some(path);
            }
        }
        if let Ok(backend) = std::env::var("RISK_BACKEND") {
            self.backend = match backend.as_str() {
                "json"   => BackendKind::Json,
                "sqlite" => BackendKind::Sqlite,
                other    => anyhow::bail!("RISK_BACKEND must be 'json' or 'sqlite', got '{other}'"),
            };
        }
        self.check()?;
        Ok(self)
    }

    /// No persistence, no debounce delay.
    pub fn default_test() -> Self {
        Self {
            debounce_ms: 0,
            ..Self::default()
        }
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Backend for `persist_path`, or None when persistence is off.
    pub fn open_backend(&self) -> anyhow::Result<Option<Box<dyn RecordBackend>>> {
        let Some(path) = &self.persist_path else {
            return Ok(None);
        };
        let backend: Box<dyn RecordBackend> = match self.backend {
            BackendKind::Json   => Box::new(JsonFileBackend::new(path)),
            BackendKind::Sqlite => Box::new(SqliteBackend::open(path)?),
        };
        Ok(Some(backend))
    }

    fn check(&self) -> anyhow::Result<()> {
        let pagination = &self.pagination;
        if pagination.max_page_size == 0 {
            anyhow::bail!("pagination.maxPageSize must be at least 1");
        }
        if pagination.default_page_size == 0 || pagination.default_page_size > pagination.max_page_size {
            anyhow::bail!(
                "pagination.defaultPageSize must be between 1 and {}",
                pagination.max_page_size
            );
        }
        let simulation = &self.simulation;
        if simulation.default_iterations == 0 || simulation.default_iterations > simulation.max_iterations {
            anyhow::bail!(
                "simulation.defaultIterations must be between 1 and {}",
                simulation.max_iterations
            );
        }
        if !simulation.default_volatility.is_finite() || simulation.default_volatility < 0.0 {
            anyhow::bail!("simulation.defaultVolatility must be a non-negative number");
        }
        Ok(())
    }
}
