mod requests;
mod responses;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use log::info;
use urania::chart::{ChartDefaults, ChartService};
use urania::ephemeris::{Coordinates, HouseSystem, SwissEphemerisAdapter};
use urania::location::LocationResolver;
use urania::remote::{HttpTimezoneLookup, NominatimGeocoder};
use urania::time::{parse_zone, AmbiguityPolicy, TimeResolver};
use urania_config::{AmbiguousSetting, UraniaConfig, ZoneSourceSetting};

use crate::routes::{create_router, AppState};

fn build_service(config: &UraniaConfig) -> anyhow::Result<ChartService> {
    let adapter = SwissEphemerisAdapter::new(config.ephemeris.path.clone())?;
    info!(
        "ephemeris mode: {} ({:?})",
        adapter.mode(),
        adapter.ephemeris_path()
    );

    let geocoder_timeout = Duration::from_secs(config.geocoder.timeout_secs);
    let geocoder = NominatimGeocoder::new(
        &config.geocoder.url,
        &config.geocoder.user_agent,
        geocoder_timeout,
    )
    .context("building geocoder client")?;

    let lookup_timeout = Duration::from_secs(config.timezone_lookup.timeout_secs);
    let lookup = HttpTimezoneLookup::new(
        &config.timezone_lookup.url,
        &config.geocoder.user_agent,
        lookup_timeout,
    )
    .context("building timezone lookup client")?;

    let policy = match config.time.ambiguous {
        AmbiguousSetting::Standard => AmbiguityPolicy::PreferStandard,
        AmbiguousSetting::Reject => AmbiguityPolicy::Reject,
    };

    let defaults = ChartDefaults {
        house_system: HouseSystem::parse(&config.ephemeris.house_system)?,
        topocentric: config.ephemeris.topocentric,
        default_zone: parse_zone(&config.time.default_zone)?,
        zone_from_coordinates: config.time.zone_source == ZoneSourceSetting::Coordinates,
        transit_location: Coordinates::new(config.transit.latitude, config.transit.longitude)?,
    };

    Ok(ChartService::new(
        Arc::new(adapter),
        LocationResolver::new(Arc::new(geocoder), geocoder_timeout),
        TimeResolver::new(Some(Arc::new(lookup)), lookup_timeout, policy),
        defaults,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = urania_config::load()?;
    let service = build_service(&config)?;
    info!(
        "defaults: {} houses, zone {} ({:?}), ambiguous times {:?}, topocentric {}",
        service.defaults().house_system.name(),
        service.defaults().default_zone,
        config.time.zone_source,
        config.time.ambiguous,
        service.defaults().topocentric
    );

    let router = create_router(AppState {
        service: Arc::new(service),
    });
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("binding {}", config.server.bind))?;
    info!("listening on {}", config.server.bind);
    axum::serve(listener, router).await?;
    Ok(())
}
