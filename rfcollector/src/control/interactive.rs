//! Line-oriented local command source

use std::time::Duration;

use rfcollector_types::{Command, CommandSource, CommandVerb};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::apply;
use crate::error::Result;
use crate::session::Session;

/// Runs a timed collection each time a start line is read
///
/// A line reading `p` or `start` (any case) starts scanning, waits for the
/// collection duration, then stops. Lines that are not valid UTF-8 are read
/// lossily and ignored unless they still spell a start. End of input ends
/// the loop.
pub struct InteractiveSource<R> {
    session: Session,
    input: R,
    duration: Duration,
    cancel: CancellationToken,
}

impl<R> InteractiveSource<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(session: Session, input: R, duration: Duration, cancel: CancellationToken) -> Self {
        Self {
            session,
            input,
            duration,
            cancel,
        }
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            session,
            mut input,
            duration,
            cancel,
        } = self;
        let mut buf = Vec::new();

        loop {
            info!("Enter 'P' to collect for {:?}", duration);

            buf.clear();
            let read = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Interactive source cancelled");
                    break;
                }
                read = input.read_until(b'\n', &mut buf) => read?,
            };

            if read == 0 {
                debug!("Interactive input closed");
                break;
            }

            // Terminal input is not guaranteed to be UTF-8
            let line = String::from_utf8_lossy(&buf);
            if !is_start(&line) {
                debug!("Ignoring input {:?}", line.trim());
                continue;
            }

            collect(&session, duration, &cancel).await;
        }

        Ok(())
    }
}

fn is_start(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("p") || line.eq_ignore_ascii_case("start")
}

/// Start, wait out the collection, stop
///
/// Cancellation shortens the wait but the stop is still sent. When start
/// did not take effect there is nothing to wait for.
async fn collect(session: &Session, duration: Duration, cancel: &CancellationToken) {
    let start = Command::new(CommandVerb::Start, CommandSource::Interactive);
    match apply(session, start).await {
        Ok(transition) if transition.is_applied() => {}
        _ => return,
    }

    tokio::select! {
        _ = cancel.cancelled() => info!("Collection cut short"),
        _ = tokio::time::sleep(duration) => info!("Collection finished"),
    }

    let stop = Command::new(CommandVerb::Stop, CommandSource::Interactive);
    let _ = apply(session, stop).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::sink::MockTagSink;
    use crate::session::SessionState;
    use std::sync::Arc;

    #[test]
    fn test_is_start() {
        assert!(is_start("p"));
        assert!(is_start(" P\n"));
        assert!(is_start("Start"));
        assert!(!is_start("stop"));
        assert!(!is_start(""));
    }

    #[tokio::test]
    async fn test_eof_ends_loop_without_touching_session() {
        let session = Session::new(SessionConfig::default(), Arc::new(MockTagSink::new()), None);
        let input: &[u8] = b"hello\np\n";
        let source = InteractiveSource::new(
            session.clone(),
            input,
            Duration::from_secs(20),
            CancellationToken::new(),
        );

        source.run().await.unwrap();

        // Start on a closed session is a no-op, so no collection ran
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(session.next_message_id(), 1);
    }

    #[tokio::test]
    async fn test_cancel_ends_loop() {
        let session = Session::new(SessionConfig::default(), Arc::new(MockTagSink::new()), None);
        let (_keep_open, reader) = tokio::io::duplex(64);
        let cancel = CancellationToken::new();
        let source = InteractiveSource::new(
            session,
            tokio::io::BufReader::new(reader),
            Duration::from_secs(20),
            cancel.clone(),
        );

        cancel.cancel();
        source.run().await.unwrap();
    }
}
