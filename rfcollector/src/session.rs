//! Reader session state machine
//!
//! A [`Session`] owns the connection to one reader. Every operation
//! (`open`, `start`, `stop`, `close`) takes the session's operation lock for
//! its whole duration, so no two operations ever interleave and at most one
//! transaction is in flight. Calls that make no sense in the current state
//! return [`Transition::Ignored`] instead of failing.
//!
//! ```text
//! Closed -> Connecting -> Bootstrapping -> Ready <-> Running
//!                                            ^          |
//!                                            +- Stopping
//! any in-progress step --(fatal error)--> Faulted
//! any state --close()--> Closing -> Closed
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rfcollector_core::Request;
use rfcollector_transport::{InboundHandler, Transport};
use rfcollector_types::ReaderInfo;
use tokio::sync::Mutex;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::bootstrap;
use crate::config::SessionConfig;
use crate::definition::{JobDefinition, ReaderConfigDefinition};
use crate::dispatcher::Dispatcher;
use crate::error::{Error, Result};
use crate::executor::{Executor, PendingSlot};
use crate::sink::{EventObserver, TagSink};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No connection
    Closed,

    /// Establishing the connection
    Connecting,

    /// Running the bootstrap sequence
    Bootstrapping,

    /// Job installed and enabled, not scanning
    Ready,

    /// Scanning
    Running,

    /// Stop in progress
    Stopping,

    /// Close in progress
    Closing,

    /// A fatal error occurred; only `close` is accepted
    Faulted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What an operation did to the session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied { from: SessionState, to: SessionState },

    /// The operation does not apply in `state` and did nothing
    Ignored { state: SessionState },
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied { from, to } => write!(f, "{from} -> {to}"),
            Self::Ignored { state } => write!(f, "ignored in {state}"),
        }
    }
}

/// State only touched while the operation lock is held
#[derive(Default)]
struct Link {
    transport: Option<Box<dyn Transport>>,
    /// ROSpec installed on the reader
    job: Option<u32>,
}

struct SessionInner {
    config: SessionConfig,
    link: Mutex<Link>,
    state: RwLock<SessionState>,
    reader_info: RwLock<Option<ReaderInfo>>,
    executor: Executor,
    pending: Arc<PendingSlot>,
    dispatcher: Arc<Dispatcher>,
}

/// Reader session
///
/// Cloning is cheap; clones drive the same session.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use rfcollector::{ChannelSink, JobDefinition, ReaderConfigDefinition, Session, SessionConfig};
/// use rfcollector_transport::TcpTransport;
///
/// #[tokio::main]
/// async fn main() -> rfcollector::Result<()> {
///     let (sink, mut tags) = ChannelSink::new(1024);
///     let session = Session::new(SessionConfig::default(), Arc::new(sink), None);
///
///     let config = ReaderConfigDefinition::load("reader_config.llrp")?;
///     let job = JobDefinition::load("rospec.llrp")?;
///     session
///         .open(Box::new(TcpTransport::new("192.168.1.50", 5084)), config, job)
///         .await?;
///
///     session.start().await?;
///     while let Some(tag) = tags.recv().await {
///         println!("{}", tag);
///     }
///     session.close().await;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        sink: Arc<dyn TagSink>,
        observer: Option<Arc<dyn EventObserver>>,
    ) -> Self {
        let pending = Arc::new(PendingSlot::new());
        let executor = Executor::new(Arc::clone(&pending), config.transaction_timeout());
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&pending),
            sink,
            observer,
            config.vendor_id(),
        ));

        Self {
            inner: Arc::new(SessionInner {
                config,
                link: Mutex::new(Link::default()),
                state: RwLock::new(SessionState::Closed),
                reader_info: RwLock::new(None),
                executor,
                pending,
                dispatcher,
            }),
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// What the reader reported during bootstrap
    pub fn reader_info(&self) -> Option<ReaderInfo> {
        self.inner.reader_info.read().clone()
    }

    /// Id the next request will carry
    pub fn next_message_id(&self) -> u32 {
        self.inner.executor.ids().peek()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    fn set_state(&self, state: SessionState) {
        let previous = std::mem::replace(&mut *self.inner.state.write(), state);
        if previous != state {
            debug!("Session state {} -> {}", previous, state);
        }
    }

    fn fault(&self, err: &Error) {
        error!("Session faulted: {}", err);
        self.set_state(SessionState::Faulted);
    }

    /// Connect and bootstrap the reader
    ///
    /// Does nothing unless the session is [`SessionState::Closed`]. On
    /// success the session is [`SessionState::Ready`]; on any failure it is
    /// [`SessionState::Faulted`] and must be closed before opening again.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] when the transport cannot connect or the
    ///   reader refuses the connection
    /// - [`Error::Bootstrap`] naming the step that failed
    pub async fn open(
        &self,
        transport: Box<dyn Transport>,
        config: ReaderConfigDefinition,
        job: JobDefinition,
    ) -> Result<Transition> {
        let span = info_span!("open", reader = %transport.remote_addr());
        self.open_locked(transport, config, job).instrument(span).await
    }

    async fn open_locked(
        &self,
        mut transport: Box<dyn Transport>,
        config: ReaderConfigDefinition,
        job: JobDefinition,
    ) -> Result<Transition> {
        let mut link = self.inner.link.lock().await;

        let state = self.state();
        if state != SessionState::Closed {
            info!("open ignored: session is {}", state);
            return Ok(Transition::Ignored { state });
        }

        self.set_state(SessionState::Connecting);
        info!("Connecting to {}...", transport.remote_addr());

        let attempt = self.inner.dispatcher.expect_connection_attempt();
        let handler: Arc<dyn InboundHandler> = self.inner.dispatcher.clone();
        if let Err(e) = transport.connect(handler).await {
            let err = Error::Connection(e.to_string());
            self.fault(&err);
            return Err(err);
        }
        link.transport = Some(transport);

        let wait = self.inner.config.transaction_timeout();
        let refused = match tokio::time::timeout(wait, attempt).await {
            Ok(Ok(status)) if status.is_success() => None,
            Ok(Ok(status)) => Some(format!("reader refused connection: {status:?}")),
            Ok(Err(_)) => Some("connection closed before the reader confirmed it".to_string()),
            Err(_) => Some(format!("no connection confirmation within {wait:?}")),
        };
        if let Some(reason) = refused {
            let err = Error::Connection(reason);
            self.fault(&err);
            return Err(err);
        }
        info!("Connection confirmed");

        self.set_state(SessionState::Bootstrapping);
        let Link { transport, job: installed } = &mut *link;
        let transport = transport
            .as_deref_mut()
            .ok_or_else(|| Error::Connection("transport missing".into()))?;

        match bootstrap::run(
            &self.inner.executor,
            transport,
            &config,
            &job,
            self.inner.config.vendor_id(),
            installed,
        )
        .await
        {
            Ok(reader_info) => {
                info!("Bootstrap complete: {}", reader_info);
                *self.inner.reader_info.write() = Some(reader_info);
                self.set_state(SessionState::Ready);
                Ok(Transition::Applied {
                    from: SessionState::Closed,
                    to: SessionState::Ready,
                })
            }
            Err(e) => {
                self.fault(&e);
                Err(e)
            }
        }
    }

    /// Start scanning
    ///
    /// Valid only from [`SessionState::Ready`]: enables the job again, then
    /// starts it. From any other state this does nothing.
    ///
    /// # Errors
    ///
    /// A timeout or rejection faults the session.
    pub async fn start(&self) -> Result<Transition> {
        self.start_locked().instrument(info_span!("start")).await
    }

    async fn start_locked(&self) -> Result<Transition> {
        let mut link = self.inner.link.lock().await;

        let state = self.state();
        if state != SessionState::Ready {
            info!("start ignored: session is {}", state);
            return Ok(Transition::Ignored { state });
        }

        let (transport, rospec_id) = link.armed()?;
        let requests = [
            Request::EnableRoSpec { rospec_id },
            Request::StartRoSpec { rospec_id },
        ];
        for request in &requests {
            if let Err(e) = self.inner.executor.execute(&mut *transport, request).await {
                self.fault(&e);
                return Err(e);
            }
        }

        self.set_state(SessionState::Running);
        info!("Scanning started (ROSpec {})", rospec_id);
        Ok(Transition::Applied {
            from: SessionState::Ready,
            to: SessionState::Running,
        })
    }

    /// Stop scanning
    ///
    /// Valid only from [`SessionState::Running`]: stops the job, then
    /// disables it. A failed disable is only logged since the reader has
    /// already stopped. From any other state this does nothing.
    ///
    /// # Errors
    ///
    /// A failed stop faults the session.
    pub async fn stop(&self) -> Result<Transition> {
        self.stop_locked().instrument(info_span!("stop")).await
    }

    async fn stop_locked(&self) -> Result<Transition> {
        let mut link = self.inner.link.lock().await;

        let state = self.state();
        if state != SessionState::Running {
            info!("stop ignored: session is {}", state);
            return Ok(Transition::Ignored { state });
        }

        let (transport, rospec_id) = link.armed()?;
        self.set_state(SessionState::Stopping);

        let stop = Request::StopRoSpec { rospec_id };
        if let Err(e) = self.inner.executor.execute(&mut *transport, &stop).await {
            self.fault(&e);
            return Err(e);
        }

        let disable = Request::DisableRoSpec { rospec_id };
        if let Err(e) = self.inner.executor.execute(&mut *transport, &disable).await {
            warn!("{} failed after stop: {}", disable.operation(), e);
        }

        self.set_state(SessionState::Ready);
        info!("Scanning stopped (ROSpec {})", rospec_id);
        Ok(Transition::Applied {
            from: SessionState::Running,
            to: SessionState::Ready,
        })
    }

    /// Tear the session down
    ///
    /// Disables the installed job and asks the reader to close the
    /// connection, both best effort, then drops the transport. Never fails;
    /// on an already closed session it does nothing.
    pub async fn close(&self) -> Transition {
        self.close_locked().instrument(info_span!("close")).await
    }

    async fn close_locked(&self) -> Transition {
        let mut link = self.inner.link.lock().await;

        let from = self.state();
        if from == SessionState::Closed {
            debug!("close ignored: session is already closed");
            return Transition::Ignored { state: from };
        }

        self.set_state(SessionState::Closing);
        info!("Closing session (was {})", from);

        let job = link.job.take();
        if let Some(mut transport) = link.transport.take() {
            if transport.is_connected() {
                self.say_goodbye(&mut *transport, job).await;
            }
            if let Err(e) = transport.disconnect().await {
                warn!("Disconnect failed: {}", e);
            }
        }

        self.inner
            .pending
            .fail_any(|operation| Error::Disconnected { operation });
        self.set_state(SessionState::Closed);
        info!("Session closed");
        Transition::Applied {
            from,
            to: SessionState::Closed,
        }
    }

    async fn say_goodbye(&self, transport: &mut dyn Transport, job: Option<u32>) {
        let mut requests = Vec::with_capacity(2);
        if let Some(rospec_id) = job {
            requests.push(Request::DisableRoSpec { rospec_id });
        }
        requests.push(Request::CloseConnection);

        for request in &requests {
            if let Err(e) = self.inner.executor.execute(&mut *transport, request).await {
                warn!("{} failed during close: {}", request.operation(), e);
            }
        }
    }
}

impl Link {
    /// Transport and job of a bootstrapped session
    fn armed(&mut self) -> Result<(&mut dyn Transport, u32)> {
        let rospec_id = self
            .job
            .ok_or_else(|| Error::InvalidResponse("no ROSpec installed".into()))?;
        let transport = self
            .transport
            .as_deref_mut()
            .ok_or_else(|| Error::Connection("not connected".into()))?;
        Ok((transport, rospec_id))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("config", &self.inner.config)
            .finish()
    }
}
