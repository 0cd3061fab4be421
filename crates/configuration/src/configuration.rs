//! Configuration for the engine.

use schemars::{gen::SchemaSettings, schema::RootSchema};

use query_engine_metadata::metadata;

use crate::values::{PoolSettings, QuerySettings};
use crate::version1::ParsedConfiguration;

/// The 'Configuration' type collects all the information necessary to serve queries at runtime.
///
/// Values of this type are produced from a 'ParsedConfiguration' using
/// 'make_runtime_configuration', which resolves secrets from the environment.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub metadata: metadata::Metadata,
    pub pool_settings: PoolSettings,
    pub query_settings: QuerySettings,
    pub connection_uri: String,
}

/// The JSON schema of the configuration file.
pub fn generate_latest_schema() -> RootSchema {
    SchemaSettings::openapi3()
        .into_generator()
        .into_root_schema_for::<ParsedConfiguration>()
}
