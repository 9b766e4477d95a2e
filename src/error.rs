//! Error kinds for the typed X11 access layer.
//!
//! A single closed enumeration instead of an exception hierarchy: callers
//! branch on `PropertyNotExisting` as a normal outcome and treat the other
//! kinds as hard failures. Nothing in this crate retries; connection-level
//! recovery belongs to the transport.

use thiserror::Error;

use crate::types::{AtomId, WindowId};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, X11Error>;

#[derive(Debug, Error)]
pub enum X11Error {
    /// Opening the display connection failed.
    #[error("failed to open display: {0}")]
    Connect(String),

    /// The server refused or could not complete an atom name interning or
    /// reverse lookup.
    #[error("atom mapping failed for `{name}`: {reason}")]
    AtomMapping { name: String, reason: String },

    /// A property fetch failed at the connection/protocol level. Absence of
    /// the property is *not* a query error, see [`X11Error::PropertyNotExisting`].
    #[error("property query failed on window {window}: {reason}")]
    PropertyQuery { window: WindowId, reason: String },

    /// A property write or delete failed at the connection/protocol level.
    #[error("property change failed on window {window}: {reason}")]
    PropertyChange { window: WindowId, reason: String },

    /// The named property does not exist on the window. Expected and
    /// recoverable; many callers branch on this.
    #[error("property `{name}` does not exist on window {window}")]
    PropertyNotExisting { window: WindowId, name: String },

    /// The server-reported type atom or buffer structure of a property does
    /// not match the statically requested type.
    #[error("property type mismatch: {0}")]
    PropertyTypeMismatch(String),

    /// Property bytes that pass the structural checks but cannot be decoded
    /// (e.g. invalid UTF-8 in a string property).
    #[error("invalid property data: {0}")]
    InvalidPropertyData(String),

    /// The requested encoding has no traits entry. A gap in coverage, not a
    /// runtime fault.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

impl X11Error {
    /// Shorthand used by the decoding layer.
    pub(crate) fn type_mismatch(detail: impl Into<String>) -> Self {
        Self::PropertyTypeMismatch(detail.into())
    }

    /// Mismatch between the requested type atom and the one the server
    /// reported for the property.
    pub(crate) fn atom_mismatch(expected: AtomId, found: AtomId) -> Self {
        Self::PropertyTypeMismatch(format!(
            "expected type atom {expected}, server reported {found}"
        ))
    }
}
