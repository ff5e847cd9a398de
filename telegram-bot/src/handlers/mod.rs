//! Framework handlers shared by every bot built on this crate.

mod logging_handler;

pub use logging_handler::LoggingHandler;
