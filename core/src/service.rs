//! Service facade — what the request layer (HTTP, IPC) talks to.
//!
//! Each operation validates at the boundary, runs the formula engine, and
//! then touches the store. Simulations and sweeps never touch the store.

use crate::{
    config::RiskConfig,
    error::{RiskError, RiskResult},
    model::{QualitativeInput, QuantitativeInput},
    query::{Page, RiskQuery},
    record::{Assessment, RiskRecord},
    rng::SimRng,
    seed::default_seeds,
    simulation::{run_simulation_parallel, SimulationParams, SimulationSummary},
    stats::RiskStats,
    store::RiskStore,
    sweep::{sweep_controls, SweepAxis, SweepPoint},
};
use std::time::Instant;

pub struct RiskService {
    pub config: RiskConfig,
    store:      RiskStore,
    rng:        SimRng,
}

impl RiskService {
    pub fn new(config: RiskConfig, store: RiskStore) -> Self {
        Self {
            config,
            store,
            rng: SimRng::from_entropy(),
        }
    }

    /// Open the configured backend (if any) and load its records.
    pub fn open(config: RiskConfig) -> anyhow::Result<Self> {
        let store = match config.open_backend()? {
            Some(backend) => RiskStore::open(backend, config.quiet_period())?,
            None => RiskStore::in_memory(),
        };
        Ok(Self::new(config, store))
    }

    /// Service over an empty, unpersisted store.
    pub fn build_test() -> Self {
        Self::new(RiskConfig::default_test(), RiskStore::in_memory())
    }

    /// Seed simulation runs deterministically.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SimRng::seeded(seed);
        self
    }

    pub fn store(&self) -> &RiskStore {
        &self.store
    }

    // ── Records ────────────────────────────────────────────────────

    pub fn create_qualitative(&mut self, input: QualitativeInput) -> RiskResult<RiskRecord> {
        let assessment = Assessment::qualitative(input)?;
        Ok(self.store.create(assessment))
    }

    pub fn create_quantitative(&mut self, input: QuantitativeInput) -> RiskResult<RiskRecord> {
        let assessment = Assessment::quantitative(input)?;
        Ok(self.store.create(assessment))
    }

    /// Rescore and replace. Unknown id ⇒ Ok(None).
    pub fn update_qualitative(
        &mut self,
        id: &str,
        input: QualitativeInput,
    ) -> RiskResult<Option<RiskRecord>> {
        let assessment = Assessment::qualitative(input)?;
        self.store.update(id, assessment)
    }

    /// Rescore and replace. Unknown id ⇒ Ok(None).
    pub fn update_quantitative(
        &mut self,
        id: &str,
        input: QuantitativeInput,
    ) -> RiskResult<Option<RiskRecord>> {
        let assessment = Assessment::quantitative(input)?;
        self.store.update(id, assessment)
    }

    /// An omitted page size takes `pagination.defaultPageSize`.
    pub fn find_all(&self, query: &RiskQuery) -> RiskResult<Page<RiskRecord>> {
        let pagination = &self.config.pagination;
        let query = query.clone().with_default_page_size(pagination.default_page_size);
        query.validate(pagination.max_page_size)?;
        Ok(self.store.find_all(&query))
    }

    pub fn find_by_id(&self, id: &str) -> Option<&RiskRecord> {
        self.store.find_by_id(id)
    }

    /// As `find_by_id`, for callers that treat absence as an error.
    pub fn require(&self, id: &str) -> RiskResult<&RiskRecord> {
        self.store
            .find_by_id(id)
            .ok_or_else(|| RiskError::NotFound { id: id.to_string() })
    }

    pub fn delete(&mut self, id: &str) -> bool {
        self.store.delete(id)
    }

    pub fn stats(&self) -> RiskStats {
        self.store.stats()
    }

    /// Populate an empty store with the demo records. No-op otherwise.
    pub fn seed_defaults(&mut self) -> RiskResult<Vec<RiskRecord>> {
        if !self.store.is_empty() {
            return Ok(Vec::new());
        }
        let created = default_seeds()?
            .into_iter()
            .map(|assessment| self.store.create(assessment))
            .collect();
        Ok(created)
    }

    // ── Simulation ─────────────────────────────────────────────────

    /// Monte Carlo run with config defaults for missing parameters.
    pub fn simulate(
        &mut self,
        input: &QuantitativeInput,
        iterations: Option<usize>,
        volatility: Option<f64>,
    ) -> RiskResult<SimulationSummary> {
        let defaults = &self.config.simulation;
        let params = SimulationParams::new(
            iterations.unwrap_or(defaults.default_iterations),
            volatility.unwrap_or(defaults.default_volatility),
        );
        params.validate(defaults.max_iterations)?;
        let master_seed = self.rng.next_u64();
        run_simulation_parallel(input, params, master_seed)
    }

    pub fn sweep(
        &self,
        input: &QuantitativeInput,
        axis: SweepAxis,
        steps: usize,
    ) -> RiskResult<Vec<SweepPoint>> {
        if steps > self.config.simulation.max_iterations {
            return Err(RiskError::validation(
                "steps",
                format!("must not exceed {}", self.config.simulation.max_iterations),
            ));
        }
        sweep_controls(input, axis, steps)
    }

    // ── Persistence ────────────────────────────────────────────────

    pub fn poll_persistence(&mut self, now: Instant) -> bool {
        self.store.poll_persistence(now)
    }

    pub fn flush(&mut self) -> bool {
        self.store.flush()
    }
}
