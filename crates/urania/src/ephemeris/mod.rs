pub mod adapter;
pub mod provider;
pub mod topocentric;
pub mod types;

pub use adapter::{AdapterError, SwissEphemerisAdapter};
pub use provider::PositionProvider;
pub use types::{
    Body, Coordinates, HouseSystem, Observer, ProviderError, RawHouses, RawPosition,
};
