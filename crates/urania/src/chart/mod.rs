pub mod assembler;
pub mod progression;
pub mod service;
pub mod transit;
pub mod types;

pub use assembler::{ChartAssembler, ChartOptions};
pub use progression::{age_in_years, CivilSpan, ProgressionEngine, ProgressionMethod, ProgressionResult};
pub use service::{ChartDefaults, ChartService, NatalRequest, SolarArcRequest, TransitRequest};
pub use transit::transit_chart;
pub use types::{BodyPlacement, Chart, ProgressedPlacement};
