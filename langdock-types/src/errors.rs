use std::io;
use thiserror::Error;

use crate::endpoint::ResolvedEndpoint;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: ResolvedEndpoint,
        #[source]
        source: io::Error,
    },

    #[error("failed to close connection to {endpoint}: {source}")]
    Close {
        endpoint: ResolvedEndpoint,
        #[source]
        source: io::Error,
    },
}

impl SessionError {
    pub fn endpoint(&self) -> &ResolvedEndpoint {
        match self {
            SessionError::Connect { endpoint, .. } | SessionError::Close { endpoint, .. } => {
                endpoint
            }
        }
    }
}
