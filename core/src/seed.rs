//! Demo records used to populate an empty store.

use crate::{
    error::RiskResult,
    model::{QualitativeInput, QuantitativeInput},
    record::Assessment,
};

/// One qualitative and one quantitative assessment, already scored.
pub fn default_seeds() -> RiskResult<Vec<Assessment>> {
    let core_db = QualitativeInput::new("Core DB", "SQL injection", 4, 5).with_controls(0.4, 0.6);
    let web_fleet = QuantitativeInput::new(50_000.0, 0.3, 0.5).with_controls(2_000.0, 0.4, 0.3);

    Ok(vec![
        Assessment::qualitative(core_db)?,
        Assessment::quantitative(web_fleet)?,
    ])
}
