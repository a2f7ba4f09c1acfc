//! Type definitions for rfcollector

pub mod command;
pub mod error;
pub mod reader_info;
pub mod tag_event;

pub use command::{Command, CommandSource, CommandVerb};
pub use error::{Error, Result};
pub use reader_info::ReaderInfo;
pub use tag_event::TagEvent;
