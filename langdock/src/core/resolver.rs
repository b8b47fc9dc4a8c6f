use std::collections::HashMap;
use std::sync::Arc;

use langdock_types::ResolvedEndpoint;
use tracing::warn;

use crate::config::{CategoryTable, EndpointConfig};

/// Where override variables are read from. Consulted on every resolution.
pub trait VarSource: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl VarSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl VarSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Computes the address for a category. Per field, the first set variable
/// wins: category-specific, then generic, then the compiled default.
#[derive(Clone)]
pub struct EndpointResolver {
    table: Arc<CategoryTable>,
    vars: Arc<dyn VarSource>,
}

impl EndpointResolver {
    pub fn new(table: Arc<CategoryTable>, vars: Arc<dyn VarSource>) -> Self {
        Self { table, vars }
    }

    pub fn from_env(table: Arc<CategoryTable>) -> Self {
        Self::new(table, Arc::new(ProcessEnv))
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    pub fn resolve(&self, config: &EndpointConfig) -> ResolvedEndpoint {
        let generic = self.table.generic();

        let host = self
            .lookup(&config.host_var, &generic.host_var)
            .map(|(_, value)| value.trim().to_string())
            .unwrap_or_else(|| config.default_host.clone());

        let port = match self.lookup(&config.port_var, &generic.port_var) {
            Some((var, raw)) => parse_port(&raw).unwrap_or_else(|| {
                warn!(
                    var,
                    value = %raw,
                    default = config.default_port,
                    "ignoring malformed port override"
                );
                config.default_port
            }),
            None => config.default_port,
        };

        ResolvedEndpoint::new(host, port)
    }

    /// Resolves a category by name; `None` when the table does not know it.
    pub fn resolve_category(&self, name: &str) -> Option<ResolvedEndpoint> {
        self.table.lookup(name).map(|(_, config)| self.resolve(config))
    }

    fn lookup<'a>(&self, specific: &'a str, generic: &'a str) -> Option<(&'a str, String)> {
        [specific, generic].into_iter().find_map(|var| {
            self.vars
                .var(var)
                .filter(|value| !value.trim().is_empty())
                .map(|value| (var, value))
        })
    }
}

fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse::<u16>().ok().filter(|port| *port != 0)
}
