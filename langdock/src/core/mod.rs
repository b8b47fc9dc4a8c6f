pub mod broker;
pub mod resolver;
pub mod session;
