//! The fixture configuration: the rockstar and movie tables, and the descriptors over them.

use std::path::PathBuf;

use autoquery_configuration::environment::EmptyEnvironment;
use autoquery_configuration::Configuration;

/// Find the fixture directory via the crate root provided by `cargo test`.
pub fn get_configuration_dir() -> PathBuf {
    let mut d = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    d.push("static");
    d
}

/// Parse the fixture configuration.
pub async fn configuration() -> anyhow::Result<Configuration> {
    let parsed_configuration =
        autoquery_configuration::parse_configuration(get_configuration_dir()).await?;
    Ok(autoquery_configuration::make_runtime_configuration(
        parsed_configuration,
        EmptyEnvironment,
    )?)
}
