use crate::record::{EngineAttributes, EngineRecord};

/// The fixed bootstrap set written by `Init`.
pub fn bootstrap_engines() -> Vec<EngineRecord> {
    vec![
        EngineRecord::new(
            "engine1",
            EngineAttributes::new("Rolls Royce", "Trent 1000", 2, "Operational", "AirlineA"),
        ),
        EngineRecord::new(
            "engine2",
            EngineAttributes::new("GE Aviation", "GE90", 5, "Operational", "AirlineB"),
        ),
    ]
}
