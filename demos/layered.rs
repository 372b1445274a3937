use strata_config::{Config, EnvLayer, FileLayer, Map, Value};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), strata_config::ConfigError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::new();
    config.add_map(Map::from([(
        "database".to_string(),
        Value::Map(Map::from([("pool_size".to_string(), Value::from(4))])),
    )]));

    // defaults -> shared file -> local overrides -> environment
    config.add_layer(&FileLayer::new("demos/default.toml", true))?;
    config.add_layer(&FileLayer::new("demos/local.yaml", false))?;
    config.add_layer(&EnvLayer::new("STRATA", "__")?)?;

    println!(
        "App: {} (debug={})",
        config.get_string("app.name"),
        config.get_bool("app.debug")
    );

    // local.yaml decodes to a loose mapping, so the section is read by path.
    println!(
        "Database: {}:{} pool={} timeout={:?} replicas={:?}",
        config.get_string("database.host"),
        config.get_int("database.port"),
        config.get_int("database.pool_size"),
        config.get_duration("database.timeout"),
        config.get_string_slice("database.replicas"),
    );

    Ok(())
}
