//! Environment configuration.
//!
//! Every field is read from a `CALLTRACE_`-prefixed variable and falls back to
//! a default, so an empty environment is a valid configuration:
//!
//! | Variable                      | Default                                          |
//! |-------------------------------|--------------------------------------------------|
//! | `CALLTRACE_BIND`              | `127.0.0.1:8080`                                 |
//! | `CALLTRACE_CONTROLLER_ROOT`   | `service::controller::v1_0`                      |
//! | `CALLTRACE_RULE_ROOT`         | `service::controller::v1_0::rule`                |
//! | `CALLTRACE_EXTRA_ROOTS`       | empty, comma separated                           |
//! | `CALLTRACE_ERROR_COMPONENT`   | `service::controller::v1_0::AppErrorController`  |
//! | `CALLTRACE_ADMIN_PREFIX`      | `/admin/tracing`                                 |
//!
//! The trace level itself is not configurable: it starts OFF on every run.

use serde::Deserialize;

use crate::{
    control::DEFAULT_ADMIN_PREFIX,
    error::TraceError,
    rule::{DEFAULT_CONTROLLER_ROOT, DEFAULT_ERROR_COMPONENT, DEFAULT_RULE_ROOT, EligibilityRule},
};

pub const ENV_PREFIX: &str = "CALLTRACE_";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_controller_root")]
    pub controller_root: String,
    #[serde(default = "default_rule_root")]
    pub rule_root: String,
    #[serde(default)]
    pub extra_roots: Vec<String>,
    #[serde(default = "default_error_component")]
    pub error_component: String,
    #[serde(default = "default_admin_prefix")]
    pub admin_prefix: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_controller_root() -> String {
    DEFAULT_CONTROLLER_ROOT.to_string()
}

fn default_rule_root() -> String {
    DEFAULT_RULE_ROOT.to_string()
}

fn default_error_component() -> String {
    DEFAULT_ERROR_COMPONENT.to_string()
}

fn default_admin_prefix() -> String {
    DEFAULT_ADMIN_PREFIX.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            controller_root: default_controller_root(),
            rule_root: default_rule_root(),
            extra_roots: Vec::new(),
            error_component: default_error_component(),
            admin_prefix: default_admin_prefix(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, TraceError> {
        Ok(envy::prefixed(ENV_PREFIX).from_env::<Config>()?)
    }

    /// Reads the configuration from explicit `(name, value)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, TraceError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter::<_, Config>(pairs)?)
    }

    /// The eligibility rule described by this configuration.
    pub fn rule(&self) -> EligibilityRule {
        let mut builder = EligibilityRule::builder()
            .include(&self.controller_root)
            .include(&self.rule_root);
        for root in self.extra_roots.iter().filter(|r| !r.is_empty()) {
            builder = builder.include(root);
        }
        builder.exclude(&self.error_component).build()
    }
}
