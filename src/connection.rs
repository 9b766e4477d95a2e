//! Protocol connection capability.
//!
//! The crate never talks to a socket itself; it consumes a synchronous
//! request/reply channel through [`ProtocolConnection`]. Every
//! [`x11rb::connection::Connection`] implements it via the blanket impl
//! below, and the test suite substitutes an in-memory fake. Each method is
//! one blocking round trip from the caller's perspective; cancellation and
//! timeouts are the transport's concern.

use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt, PropMode};

use crate::error::X11Error;
use crate::types::{AtomId, PropertyFormat, PropertyInfo, RawProperty, WindowId};

/// The request/reply surface this crate needs from a display server
/// connection.
pub trait ProtocolConnection {
    /// Intern `name` on the server, creating the atom if necessary.
    /// Never returns [`AtomId::INVALID`] on success.
    fn intern_name(&self, name: &str) -> Result<AtomId, X11Error>;

    /// Reverse lookup of an atom's name. `Ok(None)` means the server knows
    /// no name for this atom, which is a normal outcome, not an error.
    fn lookup_name(&self, atom: AtomId) -> Result<Option<String>, X11Error>;

    /// Fetch the complete value of a property. `Ok(None)` means the
    /// property is absent from the window.
    fn query_property(
        &self,
        window: WindowId,
        property: AtomId,
    ) -> Result<Option<RawProperty>, X11Error>;

    /// Replace the value of a property.
    fn set_property(
        &self,
        window: WindowId,
        property: AtomId,
        value: &RawProperty,
    ) -> Result<(), X11Error>;

    /// Remove a property. Deleting an absent property succeeds.
    fn delete_property(&self, window: WindowId, property: AtomId) -> Result<(), X11Error>;

    /// Enumerate the window's properties without fetching values. The order
    /// is server-defined; callers must not rely on it.
    fn list_properties(&self, window: WindowId) -> Result<Vec<PropertyInfo>, X11Error>;
}

impl<C: Connection> ProtocolConnection for C {
    fn intern_name(&self, name: &str) -> Result<AtomId, X11Error> {
        let mapping_err = |reason: String| X11Error::AtomMapping {
            name: name.to_owned(),
            reason,
        };

        let reply = self
            .intern_atom(false, name.as_bytes())
            .map_err(|e| mapping_err(e.to_string()))?
            .reply()
            .map_err(|e| mapping_err(e.to_string()))?;

        Ok(AtomId(reply.atom))
    }

    fn lookup_name(&self, atom: AtomId) -> Result<Option<String>, X11Error> {
        let mapping_err = |reason: String| X11Error::AtomMapping {
            name: atom.to_string(),
            reason,
        };

        let cookie = self
            .get_atom_name(atom.raw())
            .map_err(|e| mapping_err(e.to_string()))?;

        match cookie.reply() {
            Ok(reply) => Ok(Some(String::from_utf8_lossy(&reply.name).into_owned())),
            // The server answers a protocol error for an atom it has no name
            // for; "no name" is a normal outcome here.
            Err(x11rb::errors::ReplyError::X11Error(_)) => Ok(None),
            Err(e) => Err(mapping_err(e.to_string())),
        }
    }

    fn query_property(
        &self,
        window: WindowId,
        property: AtomId,
    ) -> Result<Option<RawProperty>, X11Error> {
        let query_err = |reason: String| X11Error::PropertyQuery { window, reason };

        let reply = self
            .get_property(false, window.raw(), property.raw(), AtomEnum::ANY, 0, u32::MAX)
            .map_err(|e| query_err(e.to_string()))?
            .reply()
            .map_err(|e| query_err(e.to_string()))?;

        if reply.type_ == x11rb::NONE {
            return Ok(None);
        }

        let format = PropertyFormat::from_raw(reply.format)?;
        debug!(
            "fetched property {} on {}: type={}, format={}, elements={}",
            property,
            window,
            reply.type_,
            format.bits(),
            reply.value_len
        );

        Ok(Some(RawProperty {
            type_atom: AtomId(reply.type_),
            format,
            value_len: reply.value_len,
            data: reply.value,
        }))
    }

    fn set_property(
        &self,
        window: WindowId,
        property: AtomId,
        value: &RawProperty,
    ) -> Result<(), X11Error> {
        let change_err = |reason: String| X11Error::PropertyChange { window, reason };

        self.change_property(
            PropMode::REPLACE,
            window.raw(),
            property.raw(),
            value.type_atom.raw(),
            value.format.bits(),
            value.value_len,
            &value.data,
        )
        .map_err(|e| change_err(e.to_string()))?
        .check()
        .map_err(|e| change_err(e.to_string()))
    }

    fn delete_property(&self, window: WindowId, property: AtomId) -> Result<(), X11Error> {
        let change_err = |reason: String| X11Error::PropertyChange { window, reason };

        ConnectionExt::delete_property(self, window.raw(), property.raw())
            .map_err(|e| change_err(e.to_string()))?
            .check()
            .map_err(|e| change_err(e.to_string()))
    }

    fn list_properties(&self, window: WindowId) -> Result<Vec<PropertyInfo>, X11Error> {
        let query_err = |reason: String| X11Error::PropertyQuery { window, reason };

        let reply = ConnectionExt::list_properties(self, window.raw())
            .map_err(|e| query_err(e.to_string()))?
            .reply()
            .map_err(|e| query_err(e.to_string()))?;

        let mut infos = Vec::with_capacity(reply.atoms.len());
        for atom in reply.atoms {
            // Zero-length fetch: the reply carries type, format and the
            // total byte count without transferring the value.
            let info = self
                .get_property(false, window.raw(), atom, AtomEnum::ANY, 0, 0)
                .map_err(|e| query_err(e.to_string()))?
                .reply()
                .map_err(|e| query_err(e.to_string()))?;

            if info.type_ == x11rb::NONE {
                // Property vanished between the two requests.
                debug!("property {} disappeared from {} during listing", atom, window);
                continue;
            }

            let format = PropertyFormat::from_raw(info.format)?;
            infos.push(PropertyInfo {
                atom: AtomId(atom),
                type_atom: AtomId(info.type_),
                format,
                value_len: info.bytes_after / format.bytes() as u32,
            });
        }

        Ok(infos)
    }
}
