pub mod category;
pub mod endpoint;
pub mod errors;
pub mod event;

// Public re-exports for easy access
pub use category::Category;
pub use endpoint::ResolvedEndpoint;
pub use errors::SessionError;
pub use event::{ActivationEvent, DocumentMeta};
