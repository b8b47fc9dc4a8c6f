pub mod config;
pub mod core;
pub mod runtime;
pub mod server;

pub use config::{CategoryTable, EndpointConfig, GenericVars};
pub use crate::core::broker::{Activation, ConnectionBroker, ShutdownReport};
pub use crate::core::resolver::{EndpointResolver, ProcessEnv, VarSource};
pub use crate::core::session::{Session, SessionChannel, SessionState};
pub use runtime::{ActivationSource, DocumentTracker, Service};
