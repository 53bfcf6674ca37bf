// firefly-api: Async Rust client for the Firefly LoRaWAN network backend

pub mod client;
pub mod error;
pub mod local_time;
pub mod models;
pub mod query;
pub mod transport;

pub use client::FireflyClient;
pub use error::Error;
pub use query::{Direction, ListAllPacketsParams, ListDevicePacketsParams, QueryParams};
pub use transport::{TlsMode, TransportConfig};
