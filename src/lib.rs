#![doc = include_str!("../README.md")]

mod config;
mod error;
mod extract;
/// NZB document model
pub mod nzb;
mod parser;
/// Filename extraction from subject lines
pub mod subject;
mod writer;
/// Generic attributed XML tree used by the parser
pub mod xml;

pub use config::ParseConfig;
pub use error::{NzbError, Result};
pub use nzb::{Nzb, NzbFile, NzbMeta, NzbSegment};
pub use parser::{NzbParser, parse};
pub use subject::{derive_name, is_par2};
