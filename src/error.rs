use std::error::Error;
use std::fmt;

/// Error returned when a lookup or removal names a key that is not present.
///
/// Operations returning this are deterministic given the container state,
/// so there is nothing to retry; the caller either handles the miss or
/// propagates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyNotFound;

impl fmt::Display for KeyNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("key not found")
    }
}

impl Error for KeyNotFound {}
