mod pool_settings;
mod query_settings;
mod secret;
pub mod uri;

pub use pool_settings::PoolSettings;
pub use query_settings::{QuerySettings, RawSqlFilterNames};
pub use secret::Secret;
pub use uri::ConnectionUri;
