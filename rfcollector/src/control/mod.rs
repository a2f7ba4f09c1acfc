//! Command sources driving a shared session
//!
//! Each source runs as its own task and stops when its cancellation token
//! fires. Sources only call `start`/`stop`; a no-op transition or a failed
//! operation is logged and the source carries on.

pub mod interactive;
pub mod udp;

pub use interactive::InteractiveSource;
pub use udp::UdpSource;

use rfcollector_types::{Command, CommandVerb};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::Result;
use crate::session::{Session, Transition};

/// Run one command against the session
///
/// [`CommandVerb::ShutdownListener`] stops scanning; ending the loop is the
/// source's job.
pub async fn apply(session: &Session, command: Command) -> Result<Transition> {
    info!("Command {}", command);

    let outcome = match command.verb {
        CommandVerb::Start => session.start().await,
        CommandVerb::Stop | CommandVerb::ShutdownListener => session.stop().await,
    };

    match &outcome {
        Ok(transition) => info!("{}: {}", command.verb, transition),
        Err(e) => warn!("{} from {} failed: {}", command.verb, command.source, e),
    }
    outcome
}

/// Cancel every source, wait for them to finish, then close the session
///
/// This is the one way out once a session has been opened, so `close` runs
/// exactly once whatever ended the collection.
pub async fn shutdown(
    session: &Session,
    sources: &mut JoinSet<Result<()>>,
    cancel: &CancellationToken,
) -> Transition {
    cancel.cancel();
    drain(sources).await;
    session.close().await
}

/// Wait for every source task, logging the ones that failed
pub async fn drain(sources: &mut JoinSet<Result<()>>) {
    while let Some(joined) = sources.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Command source failed: {}", e),
            Err(e) => warn!("Command source panicked: {}", e),
        }
    }
}
