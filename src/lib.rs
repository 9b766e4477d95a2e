//! Typed access layer over an X11 protocol connection.
//!
//! The X protocol hands applications untyped material: properties arrive as
//! byte buffers tagged with an integer type atom and an element width,
//! names must be interned into integer atoms one round trip at a time, and
//! input events are flat records with bitmask state fields. This crate
//! wraps that surface in strongly-typed domain objects:
//!
//! - [`atoms::AtomMapper`] / [`atoms::CachedAtom`] — name/atom resolution
//!   with a never-evicting bidirectional cache per connection.
//! - [`property::PropertyValue`] / [`property::TypedProperty`] — the traits
//!   table mapping Rust value types onto the wire encoding, with strict
//!   validation instead of best-effort decoding.
//! - [`window::XWindow`] — get/change/delete/list operations on a window's
//!   named properties.
//! - [`input`] — typed views over button, key and pointer-motion records.
//!
//! The transport itself stays external: everything runs against the
//! [`connection::ProtocolConnection`] capability, implemented for any
//! [`x11rb::connection::Connection`]. Malformed or missing protocol data
//! surfaces as a typed [`error::X11Error`] rather than corrupting state;
//! `PropertyNotExisting` is the one kind callers are expected to branch on
//! as a normal outcome.

pub mod atoms;
pub mod connection;
pub mod display;
pub mod error;
pub mod input;
pub mod property;
pub mod types;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use atoms::{AtomMapper, Atoms, CachedAtom};
pub use connection::ProtocolConnection;
pub use display::XDisplay;
pub use error::{Result, X11Error};
pub use input::{ButtonEvent, InputEvent, KeyEvent, Modifiers, PointerMovedEvent};
pub use property::{PropertyValue, TypedProperty, XString};
pub use types::{AtomId, Point, PropertyFormat, PropertyInfo, RawProperty, WindowId};
pub use window::XWindow;
