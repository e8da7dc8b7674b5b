use chrono::{DateTime, Utc};

use crate::chart::assembler::{ChartAssembler, ChartOptions};
use crate::chart::types::Chart;
use crate::ephemeris::{Coordinates, PositionProvider};
use crate::error::ChartError;
use crate::time::Instant;

/// Chart of the sky at `now` over `location`.
pub fn transit_chart(
    provider: &dyn PositionProvider,
    now: DateTime<Utc>,
    location: Coordinates,
    options: &ChartOptions,
) -> Result<Chart, ChartError> {
    ChartAssembler::new(provider).assemble(Instant::from_utc(now), location, options)
}
