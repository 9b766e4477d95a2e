//! Strongly-typed protocol identifiers and the raw property model.
//!
//! The X protocol passes windows, atoms and property payloads around as bare
//! integers and byte buffers. The newtypes here keep those apart at compile
//! time; [`RawProperty`] is the untyped wire-level result of a property query
//! before the traits table in [`crate::property`] has validated it.

use std::fmt;

use x11rb::protocol::xproto::{self, AtomEnum};

use crate::error::X11Error;

/// Protocol-level integer identifier for an interned name.
///
/// Scoped to one connection. [`AtomId::INVALID`] denotes "not yet resolved"
/// or "no such name"; resolution paths never hand it out for a real request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomId(pub xproto::Atom);

impl AtomId {
    pub const INVALID: AtomId = AtomId(x11rb::NONE);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    pub fn raw(self) -> xproto::Atom {
        self.0
    }
}

impl From<AtomEnum> for AtomId {
    fn from(atom: AtomEnum) -> Self {
        Self(atom.into())
    }
}

impl From<xproto::Atom> for AtomId {
    fn from(atom: xproto::Atom) -> Self {
        Self(atom)
    }
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Protocol-level window identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub xproto::Window);

impl WindowId {
    pub fn raw(self) -> xproto::Window {
        self.0
    }
}

impl From<xproto::Window> for WindowId {
    fn from(window: xproto::Window) -> Self {
        Self(window)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// A coordinate pair in event or root space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

/// Element width of a property buffer in X terms.
///
/// The wire protocol only knows 8, 16 and 32 bit elements; anything else in
/// a reply is a coverage gap and surfaces as `NotImplemented`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyFormat {
    Bits8,
    Bits16,
    Bits32,
}

impl PropertyFormat {
    pub fn from_raw(format: u8) -> Result<Self, X11Error> {
        match format {
            8 => Ok(Self::Bits8),
            16 => Ok(Self::Bits16),
            32 => Ok(Self::Bits32),
            _ => Err(X11Error::NotImplemented(
                "property format width other than 8/16/32",
            )),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
            Self::Bits32 => 32,
        }
    }

    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }
}

/// Untyped wire-level result of a property query.
///
/// Invariant: `data.len() == value_len as usize * format.bytes()`. Replies
/// from the server satisfy this by construction; [`RawProperty::from_elements`]
/// maintains it for locally encoded values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProperty {
    /// The type atom the property declares on the server.
    pub type_atom: AtomId,
    /// Element width of `data`.
    pub format: PropertyFormat,
    /// Number of `format`-sized elements in `data`.
    pub value_len: u32,
    /// The raw property bytes, native endianness.
    pub data: Vec<u8>,
}

impl RawProperty {
    /// Build a raw property from an already encoded element buffer,
    /// deriving the element count from the buffer length.
    pub fn from_elements(type_atom: AtomId, format: PropertyFormat, data: Vec<u8>) -> Self {
        let value_len = (data.len() / format.bytes()) as u32;
        Self {
            type_atom,
            format,
            value_len,
            data,
        }
    }

    /// Whether the buffer length is consistent with `value_len` and the
    /// element width.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.value_len as usize * self.format.bytes()
    }
}

/// Metadata for one property of a window, as returned by
/// [`crate::window::XWindow::list_properties`]. Carries no value bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyInfo {
    /// The property name atom.
    pub atom: AtomId,
    /// The declared type atom of the stored value.
    pub type_atom: AtomId,
    /// Element width of the stored value.
    pub format: PropertyFormat,
    /// Number of stored elements.
    pub value_len: u32,
}
