//! Risk scoring and simulation engine with an indexed in-memory record store.
//!
//! Two assessment models:
//!   - qualitative:  likelihood × impact, mitigated by controls, banded
//!   - quantitative: SLE / ALE loss expectancy, with Monte Carlo sensitivity
//!
//! Records are listed through the query planner (filter, sort, paginate).

pub mod band;
pub mod config;
pub mod error;
pub mod formula;
pub mod model;
pub mod persistence;
pub mod query;
pub mod record;
pub mod rng;
pub mod seed;
pub mod service;
pub mod simulation;
pub mod stats;
pub mod store;
pub mod sweep;
pub mod types;
