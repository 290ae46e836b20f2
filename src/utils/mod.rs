/// Tracing subscriber setup.
pub mod telemetry;
/// TOML configuration file.
pub mod toml_config;
