pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod output;
pub mod score;

pub use cache::Cache;
pub use config::{Config, FetchPolicy, Weights};
pub use error::{FetchError, TrustError};
pub use fetch::SignalFetcher;
pub use model::{MavenCoordinate, NormalizedSignal, RawSignal, SignalKind, TrustReport, TrustScore};
