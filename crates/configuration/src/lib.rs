pub mod configuration;
pub mod environment;
pub mod error;
pub mod to_runtime_configuration;
pub mod values;
pub mod version1;

pub use configuration::{generate_latest_schema, Configuration};
pub use values::{ConnectionUri, PoolSettings, QuerySettings, RawSqlFilterNames, Secret};
pub use version1::{parse_configuration, write_parsed_configuration, ParsedConfiguration};

pub use to_runtime_configuration::make_runtime_configuration;
