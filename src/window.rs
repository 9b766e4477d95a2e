//! Window property operations.
//!
//! [`XWindow`] is a borrowed handle: it resolves property names through the
//! display's atom cache, runs the raw round trip over the protocol
//! connection and validates the result through the traits table. An absent
//! property surfaces as `PropertyNotExisting` (the expected, recoverable
//! case); everything else is a hard failure for the caller to report
//! upward. Nothing here retries.

use tracing::debug;

use crate::connection::ProtocolConnection;
use crate::display::XDisplay;
use crate::error::{Result, X11Error};
use crate::property::{PropertyValue, TypedProperty, XString};
use crate::types::{AtomId, PropertyInfo, WindowId};

/// Typed property access to one window.
pub struct XWindow<'a, C: ProtocolConnection> {
    display: &'a XDisplay<C>,
    id: WindowId,
}

impl<'a, C: ProtocolConnection> XWindow<'a, C> {
    pub(crate) fn new(display: &'a XDisplay<C>, id: WindowId) -> Self {
        Self { display, id }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Fetch the property `name` as a `T`.
    ///
    /// Fails with `PropertyNotExisting` if the window has no such property,
    /// `PropertyTypeMismatch` if the stored value does not match `T`'s
    /// traits, and `PropertyQuery` for connection-level failures.
    pub fn get_property<T: PropertyValue>(&self, name: &str) -> Result<TypedProperty<T>> {
        let atom = self.display.resolve_atom(name)?;
        self.fetch(atom, name)
    }

    /// Like [`XWindow::get_property`], for an already resolved atom.
    pub fn get_property_atom<T: PropertyValue>(&self, atom: AtomId) -> Result<TypedProperty<T>> {
        match self.display.mapper().cached_name(atom) {
            Some(name) => self.fetch(atom, &name),
            None => self.fetch(atom, &format!("<atom {atom}>")),
        }
    }

    fn fetch<T: PropertyValue>(&self, atom: AtomId, name: &str) -> Result<TypedProperty<T>> {
        match self.display.conn().query_property(self.id, atom)? {
            Some(raw) => TypedProperty::parse(raw, self.display.atoms()),
            None => Err(X11Error::PropertyNotExisting {
                window: self.id,
                name: name.to_owned(),
            }),
        }
    }

    /// Replace the property `name` with `value`.
    pub fn change_property<T: PropertyValue>(&self, name: &str, value: &T) -> Result<()> {
        let atom = self.display.resolve_atom(name)?;
        self.change_property_atom(atom, value)
    }

    /// Like [`XWindow::change_property`], for an already resolved atom.
    pub fn change_property_atom<T: PropertyValue>(&self, atom: AtomId, value: &T) -> Result<()> {
        let raw = value.encode(self.display.atoms());
        debug!("changing property {} on {}", atom, self.id);
        self.display.conn().set_property(self.id, atom, &raw)
    }

    /// Remove the property `name`. Deleting an absent property succeeds.
    pub fn delete_property(&self, name: &str) -> Result<()> {
        let atom = self.display.resolve_atom(name)?;
        self.delete_property_atom(atom)
    }

    /// Like [`XWindow::delete_property`], for an already resolved atom.
    pub fn delete_property_atom(&self, atom: AtomId) -> Result<()> {
        debug!("deleting property {} on {}", atom, self.id);
        self.display.conn().delete_property(self.id, atom)
    }

    /// Enumerate this window's properties without fetching values.
    ///
    /// The order is server-defined and not stable across calls; do not use
    /// it for equality comparisons.
    pub fn list_properties(&self) -> Result<Vec<PropertyInfo>> {
        self.display.conn().list_properties(self.id)
    }

    // Convenience accessors over the common ICCCM/EWMH properties. All of
    // them go through the same typed machinery above.

    /// The window title: EWMH `_NET_WM_NAME` (UTF-8), falling back to the
    /// ICCCM `WM_NAME` Latin-1 property when the EWMH one is missing or not
    /// UTF8_STRING-typed.
    pub fn name(&self) -> Result<String> {
        let atoms = self.display.atoms();
        match self.get_property_atom::<String>(atoms.net_wm_name) {
            Ok(prop) => Ok(prop.into_value()),
            Err(X11Error::PropertyNotExisting { .. })
            | Err(X11Error::PropertyTypeMismatch(_)) => Ok(self
                .get_property_atom::<XString>(atoms.wm_name)?
                .into_value()
                .into_string()),
            Err(e) => Err(e),
        }
    }

    /// Set both the EWMH and the ICCCM window title.
    pub fn set_name(&self, name: &str) -> Result<()> {
        let atoms = self.display.atoms();
        self.change_property_atom(atoms.net_wm_name, &name.to_owned())?;
        self.change_property_atom(atoms.wm_name, &XString::from(name))
    }

    /// `_NET_WM_PID`: the process id of the client owning the window.
    pub fn pid(&self) -> Result<u32> {
        Ok(self
            .get_property_atom::<u32>(self.display.atoms().net_wm_pid)?
            .into_value())
    }

    /// `_NET_WM_DESKTOP`: the desktop the window is on.
    pub fn desktop(&self) -> Result<u32> {
        Ok(self
            .get_property_atom::<u32>(self.display.atoms().net_wm_desktop)?
            .into_value())
    }

    /// The first (most preferred) `_NET_WM_WINDOW_TYPE` entry.
    pub fn window_type(&self) -> Result<AtomId> {
        self.get_property_atom::<Vec<AtomId>>(self.display.atoms().net_wm_window_type)?
            .into_value()
            .first()
            .copied()
            .ok_or_else(|| {
                X11Error::InvalidPropertyData("_NET_WM_WINDOW_TYPE holds no atoms".into())
            })
    }

    /// The WM_CLASS (instance, class) pair.
    pub fn class_hint(&self) -> Result<(String, String)> {
        let raw = self
            .get_property_atom::<XString>(self.display.atoms().wm_class)?
            .into_value();

        let mut parts = raw.as_str().split('\0');
        match (parts.next(), parts.next()) {
            (Some(instance), Some(class)) => Ok((instance.to_owned(), class.to_owned())),
            _ => Err(X11Error::InvalidPropertyData(
                "WM_CLASS does not hold an instance/class pair".into(),
            )),
        }
    }

    /// `WM_CLIENT_LEADER`: the leader window of this window's group.
    pub fn client_leader(&self) -> Result<WindowId> {
        Ok(self
            .get_property_atom::<WindowId>(self.display.atoms().wm_client_leader)?
            .into_value())
    }

    /// `WM_CLIENT_MACHINE`: the host the client runs on.
    pub fn client_machine(&self) -> Result<String> {
        Ok(self
            .get_property_atom::<XString>(self.display.atoms().wm_client_machine)?
            .into_value()
            .into_string())
    }

    /// `WM_COMMAND`: the command line the client was started with.
    pub fn command(&self) -> Result<String> {
        Ok(self
            .get_property_atom::<XString>(self.display.atoms().wm_command)?
            .into_value()
            .into_string())
    }

    /// `WM_LOCALE_NAME`: the client's locale.
    pub fn locale(&self) -> Result<String> {
        Ok(self
            .get_property_atom::<XString>(self.display.atoms().wm_locale_name)?
            .into_value()
            .into_string())
    }

    /// The WM_PROTOCOLS atoms the client participates in.
    pub fn protocols(&self) -> Result<Vec<AtomId>> {
        Ok(self
            .get_property_atom::<Vec<AtomId>>(self.display.atoms().wm_protocols)?
            .into_value())
    }

    /// Replace the WM_PROTOCOLS list.
    pub fn set_protocols(&self, protocols: &[AtomId]) -> Result<()> {
        self.change_property_atom(self.display.atoms().wm_protocols, &protocols.to_vec())
    }
}
