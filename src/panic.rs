//! Formatting of panic payloads caught from I/O tasks.

use std::{any::Any, fmt};

/// A caught panic payload that displays its message.
///
/// String payloads print verbatim; anything else falls back to `Debug`.
///
/// ```
/// use packetlink::panic::format_panic;
///
/// assert_eq!(format_panic(Box::new("boom")).to_string(), "boom");
/// assert!(format_panic(Box::new(5_u32)).to_string().contains("Any"));
/// ```
#[derive(Debug)]
#[must_use]
pub struct PanicMessage(Box<dyn Any + Send>);

impl fmt::Display for PanicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (
            self.0.downcast_ref::<String>(),
            self.0.downcast_ref::<&'static str>(),
        ) {
            (Some(s), _) => f.write_str(s),
            (None, Some(s)) => f.write_str(s),
            (None, None) => write!(f, "{:?}", self.0),
        }
    }
}

/// Wrap a payload returned by `catch_unwind`.
pub fn format_panic(panic: Box<dyn Any + Send>) -> PanicMessage { PanicMessage(panic) }
