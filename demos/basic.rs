use optcast::{Config, OptionDecl, Schema, ValueType};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct AppConfig {
    name: String,
    port: u16,
    debug: bool,
    upstream: String,
    allowed_hosts: Vec<String>,
}

// Try: PORT=9000 cargo run --example basic -- --debug --upstream http://localhost:4000/
fn main() -> Result<(), optcast::ConfigError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let schema = Schema::new()
        .option("name", OptionDecl::new().env("APP_NAME").default_value("demo"))
        .option(
            "port",
            OptionDecl::new()
                .ty(ValueType::Number)
                .arg("port")
                .env("PORT")
                .default_value(8080),
        )
        .option("debug", OptionDecl::new().ty(ValueType::Boolean).arg("debug"))
        .option(
            "upstream",
            OptionDecl::new()
                .ty(ValueType::Url)
                .arg("upstream")
                .env("UPSTREAM_URL")
                .default_value("http://127.0.0.1:3000/"),
        )
        .option(
            "allowed_hosts",
            OptionDecl::new()
                .ty(ValueType::List)
                .env("ALLOWED_HOSTS")
                .default_value("localhost"),
        );

    // Resolved once at startup from the real process arguments and environment
    let config: AppConfig = Config::builder().build(&schema)?;

    println!("{config:#?}");
    Ok(())
}
