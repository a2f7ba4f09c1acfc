//! # rfcollector
//!
//! Session engine for Impinj LLRP RFID readers.
//!
//! ## Features
//!
//! - Strictly serialized request/response transactions with timeouts
//! - Tag reports and reader events routed to pluggable sinks in wire order
//! - A session state machine that turns out-of-place calls into no-ops
//! - Local and UDP command sources sharing one session
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use rfcollector::{CsvSink, JobDefinition, ReaderConfigDefinition, Session, SessionConfig};
//! use rfcollector_transport::TcpTransport;
//!
//! #[tokio::main]
//! async fn main() -> rfcollector::Result<()> {
//!     let sink = Arc::new(CsvSink::create("./output")?);
//!     let session = Session::new(SessionConfig::default(), sink, None);
//!
//!     // Connect and bootstrap
//!     let transport = TcpTransport::new("Speedwayr-11-25-ab.local", rfcollector_core::DEFAULT_PORT);
//!     session
//!         .open(
//!             Box::new(transport),
//!             ReaderConfigDefinition::load("reader_config.llrp")?,
//!             JobDefinition::load("rospec.llrp")?,
//!         )
//!         .await?;
//!
//!     session.start().await?;
//!     tokio::time::sleep(std::time::Duration::from_secs(20)).await;
//!     session.stop().await?;
//!
//!     session.close().await;
//!     Ok(())
//! }
//! ```

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod control;
pub mod csv;
pub mod definition;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod session;
pub mod sink;

// Re-exports
pub use bootstrap::BootstrapStep;
pub use config::SessionConfig;
pub use csv::CsvSink;
pub use definition::{JobDefinition, ReaderConfigDefinition};
pub use error::{Error, Result};
pub use session::{Session, SessionState, Transition};
pub use sink::{ChannelSink, EventObserver, TagSink};

// Re-export types
pub use rfcollector_core::ReaderEvent;
pub use rfcollector_types::{Command, CommandSource, CommandVerb, ReaderInfo, TagEvent};
