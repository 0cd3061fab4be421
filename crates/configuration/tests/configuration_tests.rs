//! Tests that the configuration format reads, writes and resolves as expected.

use similar_asserts::assert_eq;

use autoquery_configuration::environment::{FixedEnvironment, Variable};
use autoquery_configuration::error::{MakeRuntimeConfigurationError, ParseConfigurationError};
use autoquery_configuration::version1::{self, DEFAULT_CONNECTION_URI_VARIABLE};
use autoquery_configuration::{
    make_runtime_configuration, parse_configuration, write_parsed_configuration, ConnectionUri,
    ParsedConfiguration, Secret,
};

const CONFIGURATION: &str = r#"{
  "version": "1",
  "connectionUri": "sqlite::memory:",
  "poolSettings": { "maxConnections": 1, "idleTimeout": null, "connectionLifetime": null },
  "querySettings": { "enableRawSqlFilters": true },
  "metadata": {
    "entities": {
      "Rockstar": {
        "table_name": "Rockstar",
        "primary_key": "Id",
        "columns": [
          { "name": "Id", "type": "integer", "nullable": "NonNullable" },
          { "name": "FirstName", "type": "text" }
        ]
      }
    },
    "descriptors": {
      "QueryRockstars": {
        "from": "Rockstar",
        "fields": [{ "name": "FirstName", "type": { "scalar_type": "text" } }]
      }
    }
  }
}"#;

#[tokio::test]
async fn parses_a_configuration_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(version1::CONFIGURATION_FILENAME), CONFIGURATION).unwrap();

    let parsed = parse_configuration(dir.path()).await.unwrap();

    assert_eq!(
        parsed.connection_uri,
        ConnectionUri(Secret::Plain("sqlite::memory:".to_string()))
    );
    assert_eq!(parsed.pool_settings.max_connections, 1);
    assert_eq!(parsed.pool_settings.pool_timeout, 30);
    assert_eq!(parsed.pool_settings.idle_timeout, None);
    assert!(parsed.query_settings.enable_raw_sql_filters);
    assert_eq!(parsed.query_settings.max_limit, Some(100));
    assert_eq!(parsed.query_settings.raw_sql_filter_names.r#where, "_where");
    assert!(parsed
        .metadata
        .descriptors
        .0
        .contains_key("QueryRockstars"));
}

#[tokio::test]
async fn reports_where_a_configuration_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(version1::CONFIGURATION_FILENAME),
        "{\n  \"version\": \"1\",\n  \"connectionUri\": 42,\n  \"metadata\": {}\n}",
    )
    .unwrap();

    match parse_configuration(dir.path()).await {
        Err(ParseConfigurationError::ParseError { line, message, .. }) => {
            assert_eq!(line, 3, "{message}");
            assert!(message.contains("Secret"), "{message}");
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_directories_are_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let result = parse_configuration(dir.path().join("missing")).await;
    assert!(matches!(
        result,
        Err(ParseConfigurationError::IoErrorButStringified(_))
    ));
}

#[tokio::test]
async fn written_configurations_parse_back() {
    let dir = tempfile::tempdir().unwrap();
    let original: ParsedConfiguration = serde_json::from_str(CONFIGURATION).unwrap();

    write_parsed_configuration(original.clone(), dir.path())
        .await
        .unwrap();

    assert!(dir
        .path()
        .join(version1::CONFIGURATION_JSONSCHEMA_FILENAME)
        .exists());
    let parsed = parse_configuration(dir.path()).await.unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn connection_uris_resolve_from_the_environment() {
    let parsed = ParsedConfiguration::empty();
    let environment = FixedEnvironment::from([(
        Variable::from(DEFAULT_CONNECTION_URI_VARIABLE),
        "sqlite::memory:".to_string(),
    )]);

    let configuration = make_runtime_configuration(parsed, environment).unwrap();
    assert_eq!(configuration.connection_uri, "sqlite::memory:");
}

#[test]
fn unset_connection_uri_variables_are_reported() {
    let parsed = ParsedConfiguration::empty();
    let result = make_runtime_configuration(parsed, FixedEnvironment::default());
    match result {
        Err(MakeRuntimeConfigurationError::MissingEnvironmentVariable { variable, .. }) => {
            assert_eq!(variable.as_str(), DEFAULT_CONNECTION_URI_VARIABLE);
        }
        other => panic!("expected a missing variable, got {other:?}"),
    }
}

#[test]
fn the_schema_describes_the_file_format() {
    let schema = serde_json::to_value(autoquery_configuration::generate_latest_schema()).unwrap();
    let properties = schema
        .pointer("/properties")
        .and_then(serde_json::Value::as_object)
        .unwrap();
    for property in ["version", "connectionUri", "querySettings", "metadata"] {
        assert!(properties.contains_key(property), "missing {property}");
    }
}
