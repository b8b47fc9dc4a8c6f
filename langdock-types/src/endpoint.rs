use std::fmt;

/// A concrete address to dial. Computed on demand and owned by the
/// session that used it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedEndpoint {
    pub host: String,
    pub port: u16,
}

impl ResolvedEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ResolvedEndpoint {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ResolvedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
