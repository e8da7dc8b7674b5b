#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono_tz::Asia::Tokyo;
use urania::chart::{ChartDefaults, ChartService};
use urania::ephemeris::{
    Body, Coordinates, HouseSystem, Observer, PositionProvider, ProviderError, RawHouses,
    RawPosition,
};
use urania::error::ServiceError;
use urania::location::{Geocoder, LocationResolver};
use urania::time::{AmbiguityPolicy, TimeResolver};

pub const J2000: f64 = 2_451_545.0;
pub const ASCENDANT: f64 = 100.0;

/// Linear motion from a J2000 base: (base longitude, degrees per day).
fn elements(body: Body) -> (f64, f64) {
    match body {
        Body::Sun => (280.0, 0.9856),
        Body::Moon => (218.0, 13.176),
        Body::Mercury => (250.0, 1.2),
        Body::Venus => (95.0, 0.0),
        Body::Mars => (105.0, 0.0),
        Body::Jupiter => (34.0, 0.083),
        Body::Saturn => (200.0, -0.05),
        Body::Uranus => (314.0, 0.012),
        Body::Neptune => (303.0, 0.006),
        Body::Pluto => (251.0, 0.004),
        Body::MeanNode => (125.0, -0.053),
        Body::TrueNode => (123.5, -0.053),
    }
}

/// Deterministic provider with equal houses from a fixed ascendant.
#[derive(Default)]
pub struct StubProvider;

impl StubProvider {
    pub fn sun_at(jd: f64) -> f64 {
        let (base, rate) = elements(Body::Sun);
        base + rate * (jd - J2000)
    }
}

impl PositionProvider for StubProvider {
    fn body_position(
        &self,
        jd: f64,
        body: Body,
        _observer: &Observer,
    ) -> Result<RawPosition, ProviderError> {
        let (base, rate) = elements(body);
        Ok(RawPosition {
            longitude: (base + rate * (jd - J2000)).rem_euclid(360.0),
            latitude: 0.0,
            distance: 1.0,
            speed_longitude: rate,
        })
    }

    fn houses(
        &self,
        _jd: f64,
        _location: &Coordinates,
        _system: HouseSystem,
    ) -> Result<RawHouses, ProviderError> {
        let mut cusps = [0.0; 12];
        for (i, c) in cusps.iter_mut().enumerate() {
            *c = (ASCENDANT + 30.0 * i as f64) % 360.0;
        }
        Ok(RawHouses {
            cusps,
            ascendant: ASCENDANT,
            midheaven: 10.0,
        })
    }
}

/// Records, per position call, whether a topocentric observer was passed.
#[derive(Default)]
pub struct ObserverRecorder {
    pub topocentric: Mutex<Vec<bool>>,
}

impl ObserverRecorder {
    pub fn seen(&self) -> Vec<bool> {
        self.topocentric.lock().unwrap().clone()
    }
}

impl PositionProvider for ObserverRecorder {
    fn body_position(
        &self,
        jd: f64,
        body: Body,
        observer: &Observer,
    ) -> Result<RawPosition, ProviderError> {
        self.topocentric
            .lock()
            .unwrap()
            .push(matches!(observer, Observer::Topocentric(_)));
        StubProvider.body_position(jd, body, observer)
    }

    fn houses(
        &self,
        jd: f64,
        location: &Coordinates,
        system: HouseSystem,
    ) -> Result<RawHouses, ProviderError> {
        StubProvider.houses(jd, location, system)
    }
}

/// Counts calls and answers every place with Osaka.
#[derive(Default)]
pub struct CountingGeocoder {
    pub calls: AtomicUsize,
}

impl CountingGeocoder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for CountingGeocoder {
    async fn geocode(&self, _place: &str) -> Result<Option<Coordinates>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Coordinates::new(34.6937, 135.5023).unwrap()))
    }
}

/// Fails the test if the resolver ever reaches the network.
pub struct PanickingGeocoder;

#[async_trait]
impl Geocoder for PanickingGeocoder {
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, ServiceError> {
        panic!("geocoder called for {place:?}");
    }
}

pub fn tokyo() -> Coordinates {
    Coordinates::new(35.6895, 139.6917).unwrap()
}

pub fn defaults() -> ChartDefaults {
    ChartDefaults {
        house_system: HouseSystem::Porphyry,
        topocentric: false,
        default_zone: Tokyo,
        zone_from_coordinates: false,
        transit_location: tokyo(),
    }
}

pub fn service_with(geocoder: Arc<dyn Geocoder>) -> ChartService {
    service_over(Arc::new(StubProvider), geocoder)
}

pub fn service_over(provider: Arc<dyn PositionProvider>, geocoder: Arc<dyn Geocoder>) -> ChartService {
    ChartService::new(
        provider,
        LocationResolver::new(geocoder, Duration::from_secs(2)),
        TimeResolver::fixed_only(AmbiguityPolicy::default()),
        defaults(),
    )
}
