//! Merge rules: defaults and override order.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment};

/// Prefix of environment overrides, e.g. `PROTOBATCH__GENERATOR__COMPILER`.
pub const ENV_PREFIX: &str = "PROTOBATCH";

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("generator.compiler", crate::job::DEFAULT_COMPILER)?
        .set_default("generator.python", crate::job::DEFAULT_PYTHON)?
        .set_default("generator.failure_policy", "fail_fast")?
        .set_default(
            "probe.timeout_secs",
            crate::probe::DEFAULT_PROBE_TIMEOUT.as_secs(),
        )?
        .set_default(
            "probe.install_timeout_secs",
            crate::probe::DEFAULT_INSTALL_TIMEOUT.as_secs(),
        )
}

/// Keys whose environment value is a comma separated list.
const LIST_KEYS: [&str; 2] = ["generator.targets", "generator.include_paths"];

/// Environment variables win over every file source.
pub fn with_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    let environment = Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",");
    let environment = LIST_KEYS
        .iter()
        .fold(environment, |env, key| env.with_list_parse_key(key));
    builder.add_source(environment)
}
