use autoquery_configuration::environment::EmptyEnvironment;
use autoquery_configuration::Configuration;
use query_engine_sql::sql;
use query_engine_translation::translation::error::Error;
use query_engine_translation::translation::query::{self, ConstructedQuery, QueryRequest};

/// The configuration shared with the engine tests.
const FIXTURE_CONFIGURATION: &str = "../../tests/tests-common/static";

pub async fn configuration() -> anyhow::Result<Configuration> {
    let parsed_configuration =
        autoquery_configuration::parse_configuration(FIXTURE_CONFIGURATION).await?;
    Ok(autoquery_configuration::make_runtime_configuration(
        parsed_configuration,
        EmptyEnvironment,
    )?)
}

/// Translate a request against the fixture configuration.
pub async fn translate(request: QueryRequest) -> anyhow::Result<Result<ConstructedQuery, Error>> {
    let configuration = configuration().await?;
    Ok(query::translate(
        &configuration.metadata,
        &configuration.query_settings,
        &request,
    ))
}

/// Render the rows query of a request.
pub async fn test_translation(request: QueryRequest) -> anyhow::Result<sql::string::SQL> {
    let plan = translate(request).await??.plan;
    Ok(plan.query_sql())
}

/// Render only the WHERE condition of a request.
pub async fn test_condition(request: QueryRequest) -> anyhow::Result<sql::string::SQL> {
    let plan = translate(request).await??.plan;
    let sql::ast::Where(condition) = &plan.select.where_;
    let mut sql = sql::string::SQL::new();
    condition.to_sql(&mut sql);
    Ok(sql)
}

pub fn int(value: i64) -> sql::string::Param {
    sql::string::Param::Value(serde_json::Value::from(value))
}

pub fn text(value: &str) -> sql::string::Param {
    sql::string::Param::String(value.to_string())
}

/// Pretty print SQL for failure messages.
pub fn pretty(query: &str) -> String {
    sqlformat::format(
        query,
        &sqlformat::QueryParams::None,
        sqlformat::FormatOptions::default(),
    )
}
