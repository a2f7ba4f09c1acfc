//! Control-plane commands

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::{Error, Result};

/// What a command source asks the session to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandVerb {
    Start,
    Stop,
    /// Stop scanning and end the issuing source's loop
    ShutdownListener,
}

impl FromStr for CommandVerb {
    type Err = Error;

    /// Parse a datagram verb: `START`, `STOP` or `CLOSE`, trimmed and case-insensitive
    fn from_str(s: &str) -> Result<Self> {
        let verb = s.trim();
        if verb.eq_ignore_ascii_case("START") {
            Ok(Self::Start)
        } else if verb.eq_ignore_ascii_case("STOP") {
            Ok(Self::Stop)
        } else if verb.eq_ignore_ascii_case("CLOSE") {
            Ok(Self::ShutdownListener)
        } else {
            Err(Error::Parse(format!("unknown command verb {verb:?}")))
        }
    }
}

impl fmt::Display for CommandVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "START",
            Self::Stop => "STOP",
            Self::ShutdownListener => "CLOSE",
        };
        f.write_str(name)
    }
}

/// Which source issued a command; for logs only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    Interactive,
    Udp { peer: SocketAddr },
}

impl fmt::Display for CommandSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interactive => write!(f, "interactive"),
            Self::Udp { peer } => write!(f, "udp:{peer}"),
        }
    }
}

/// A verb tagged with its source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub verb: CommandVerb,
    pub source: CommandSource,
}

impl Command {
    pub fn new(verb: CommandVerb, source: CommandSource) -> Self {
        Self { verb, source }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.verb, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verbs() {
        assert_eq!("START".parse::<CommandVerb>().unwrap(), CommandVerb::Start);
        assert_eq!(" stop\n".parse::<CommandVerb>().unwrap(), CommandVerb::Stop);
        assert_eq!("Close".parse::<CommandVerb>().unwrap(), CommandVerb::ShutdownListener);
        assert!("restart".parse::<CommandVerb>().is_err());
        assert!("".parse::<CommandVerb>().is_err());
    }

    #[test]
    fn test_display() {
        let peer: SocketAddr = "10.0.0.5:9000".parse().unwrap();
        let command = Command::new(CommandVerb::ShutdownListener, CommandSource::Udp { peer });
        assert_eq!(command.to_string(), "CLOSE from udp:10.0.0.5:9000");
    }
}
