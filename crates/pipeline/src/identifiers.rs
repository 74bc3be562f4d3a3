//! Newtype domain identifiers.
//!
//! Every value that identifies something across a request's lifetime is a
//! distinct newtype wrapping a `String`. This prevents accidentally passing a
//! [`ClientKey`] where a [`CorrelationId`] is expected even though both are
//! opaque header values on the wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

string_id! {
    /// Per-request trace token.
    ///
    /// Taken from the inbound `X-Correlation-ID` header when present and
    /// non-empty, otherwise freshly generated. Attached to every span and event
    /// emitted while the request is processed and echoed on the response.
    /// Never persisted.
    CorrelationId
}

impl CorrelationId {
    /// Generates a fresh random identifier (RFC 4122 UUIDv4 text form).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Reuses `inbound` when it is present and non-empty, otherwise generates
    /// a new identifier.
    pub fn from_inbound(inbound: Option<&str>) -> Self {
        inbound
            .and_then(|value| Self::new(value))
            .unwrap_or_else(Self::generate)
    }
}

// ---------------------------------------------------------------------------
// Rate-limit keys
// ---------------------------------------------------------------------------

/// Opaque identity of a caller for rate-limiting purposes.
///
/// Unlike the identifiers produced by `string_id!`, an empty key is valid: an
/// explicitly supplied but empty `X-Client-Id` header is still a client key
/// and does not fall back to the remote address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientKey(String);

impl ClientKey {
    /// Key used when neither a client header nor a remote address is available.
    pub const UNKNOWN: &'static str = "unknown";

    /// Wraps a raw key. Empty strings are accepted.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The fallback key shared by every unidentifiable caller.
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
