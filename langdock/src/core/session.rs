use std::io;
use std::net::Shutdown;
use std::sync::Arc;

use langdock_types::{Category, ResolvedEndpoint, SessionError};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub enum SessionState {
    Connecting,
    Active,
    /// Terminal. Never retried within the broker's lifetime.
    Failed(Arc<SessionError>),
    /// Terminal. Only reached through [`Session::close`].
    Closed,
}

impl SessionState {
    pub fn is_connecting(&self) -> bool {
        matches!(self, SessionState::Connecting)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Failed(_) | SessionState::Closed)
    }
}

/// Read/write capability pair handed to the protocol layer once a session
/// is active. Clones share the same underlying socket.
#[derive(Debug, Clone)]
pub struct SessionChannel {
    pub reader: Arc<Mutex<OwnedReadHalf>>,
    pub writer: Arc<Mutex<OwnedWriteHalf>>,
}

/// The session's own hold on an active stream. `socket` is a duplicate of
/// the stream's descriptor so close never waits on the channel's locks.
#[derive(Debug)]
struct Live {
    channel: SessionChannel,
    socket: std::net::TcpStream,
}

impl Live {
    fn new(stream: TcpStream) -> io::Result<Self> {
        let std_stream = stream.into_std()?;
        let socket = std_stream.try_clone()?;
        let (reader, writer) = TcpStream::from_std(std_stream)?.into_split();
        Ok(Self {
            channel: SessionChannel {
                reader: Arc::new(Mutex::new(reader)),
                writer: Arc::new(Mutex::new(writer)),
            },
            socket,
        })
    }
}

/// One stream connection to one backend.
#[derive(Debug)]
pub struct Session {
    category: Category,
    endpoint: ResolvedEndpoint,
    state: watch::Sender<SessionState>,
    // guards every transition that involves the stream
    live: Mutex<Option<Live>>,
}

impl Session {
    /// Starts connecting in the background and returns straight away in
    /// [`SessionState::Connecting`]. Must be called inside a tokio runtime.
    pub fn open(category: Category, endpoint: ResolvedEndpoint) -> Arc<Session> {
        let (state, _) = watch::channel(SessionState::Connecting);
        let session = Arc::new(Session {
            category,
            endpoint,
            state,
            live: Mutex::new(None),
        });
        tokio::spawn(Arc::clone(&session).establish());
        session
    }

    async fn establish(self: Arc<Self>) {
        info!(
            category = %self.category,
            endpoint = %self.endpoint,
            "attempting to connect"
        );

        let mut state_rx = self.state.subscribe();
        let connect = TcpStream::connect((self.endpoint.host.as_str(), self.endpoint.port));
        let result = tokio::select! {
            result = connect => result,
            _ = state_rx.wait_for(SessionState::is_terminal) => {
                debug!(category = %self.category, "session closed before connect finished");
                return;
            }
        };

        let live = result.and_then(Live::new);
        match live {
            Ok(live) => {
                let mut slot = self.live.lock().await;
                if self.transition(SessionState::Active) {
                    *slot = Some(live);
                    info!(
                        category = %self.category,
                        endpoint = %self.endpoint,
                        "connected"
                    );
                } else {
                    debug!(category = %self.category, "session closed while connecting, dropping stream");
                }
            }
            Err(source) => {
                let err = SessionError::Connect {
                    endpoint: self.endpoint.clone(),
                    source,
                };
                error!(category = %self.category, error = %err, "connection failed");
                let _slot = self.live.lock().await;
                self.transition(SessionState::Failed(Arc::new(err)));
            }
        }
    }

    /// Moves out of Connecting. Returns false if the session already left it.
    fn transition(&self, next: SessionState) -> bool {
        self.state.send_if_modified(|current| {
            if current.is_connecting() {
                *current = next;
                true
            } else {
                false
            }
        })
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn endpoint(&self) -> &ResolvedEndpoint {
        &self.endpoint
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Waits until the connection attempt has an outcome.
    pub async fn settled(&self) -> SessionState {
        let mut rx = self.state.subscribe();
        let settled = rx
            .wait_for(|s| !s.is_connecting())
            .await
            .map(|s| s.clone());
        settled.unwrap_or_else(|_| self.state())
    }

    /// `None` unless the session is active.
    pub async fn channel(&self) -> Option<SessionChannel> {
        self.live
            .lock()
            .await
            .as_ref()
            .map(|live| live.channel.clone())
    }

    /// Releases the stream. Safe to call on a session in any state, any
    /// number of times; Failed stays Failed. Does not wait for holders of
    /// the channel: their pending reads and writes end with EOF or an error.
    pub async fn close(&self) -> Result<(), SessionError> {
        let live = {
            let mut slot = self.live.lock().await;
            self.state.send_if_modified(|current| {
                if current.is_terminal() {
                    false
                } else {
                    *current = SessionState::Closed;
                    true
                }
            });
            slot.take()
        };

        let Some(live) = live else {
            return Ok(());
        };

        debug!(category = %self.category, endpoint = %self.endpoint, "closing stream");
        match live.socket.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // the peer already tore the connection down
            Err(err) if err.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(source) => Err(SessionError::Close {
                endpoint: self.endpoint.clone(),
                source,
            }),
        }
    }
}
