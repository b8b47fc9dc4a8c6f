use langdock_types::ActivationEvent;
use tokio::sync::mpsc::UnboundedReceiver;

/// Something that reports which categories are in use. Consumers call
/// [`subscribe`](ActivationSource::subscribe) first and then replay
/// [`current`](ActivationSource::current) once, so nothing opened in between
/// is missed.
pub trait ActivationSource {
    fn subscribe(&self) -> UnboundedReceiver<ActivationEvent>;

    fn current(&self) -> Vec<ActivationEvent>;
}
