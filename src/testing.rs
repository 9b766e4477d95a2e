//! In-memory fake display server for the test suite.
//!
//! Implements [`ProtocolConnection`] over hash maps, counts round trips so
//! caching behavior is observable, and can simulate a severed connection.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::connection::ProtocolConnection;
use crate::error::X11Error;
use crate::types::{AtomId, PropertyInfo, RawProperty, WindowId};

/// Install the env-filtered test subscriber. Safe to call from every test;
/// only the first call wins.
pub(crate) fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fake server: an intern table plus a per-window property store.
pub(crate) struct FakeConnection {
    atoms: RefCell<HashMap<String, AtomId>>,
    names: RefCell<HashMap<AtomId, String>>,
    props: RefCell<HashMap<(WindowId, AtomId), RawProperty>>,
    next_atom: Cell<u32>,
    round_trips: Cell<u32>,
    severed: Cell<bool>,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self {
            atoms: RefCell::new(HashMap::new()),
            names: RefCell::new(HashMap::new()),
            props: RefCell::new(HashMap::new()),
            // Leave room below for the predefined protocol atoms.
            next_atom: Cell::new(1000),
            round_trips: Cell::new(0),
            severed: Cell::new(false),
        }
    }

    /// Number of simulated server round trips so far.
    pub fn round_trips(&self) -> u32 {
        self.round_trips.get()
    }

    /// Make every subsequent request fail, as if the connection died.
    pub fn sever(&self) {
        self.severed.set(true);
    }

    pub fn restore(&self) {
        self.severed.set(false);
    }

    /// Allocate an atom the server knows no name for.
    pub fn register_unnamed_atom(&self) -> AtomId {
        AtomId(self.bump_atom())
    }

    /// Seed a property store entry directly, bypassing the encode path.
    pub fn insert_raw(&self, window: WindowId, atom: AtomId, raw: RawProperty) {
        self.props.borrow_mut().insert((window, atom), raw);
    }

    fn bump_atom(&self) -> u32 {
        let id = self.next_atom.get();
        self.next_atom.set(id + 1);
        id
    }

    fn trip(&self) {
        self.round_trips.set(self.round_trips.get() + 1);
    }

    fn check_alive(&self, err: impl FnOnce(String) -> X11Error) -> Result<(), X11Error> {
        if self.severed.get() {
            Err(err("connection severed".to_owned()))
        } else {
            Ok(())
        }
    }
}

impl ProtocolConnection for FakeConnection {
    fn intern_name(&self, name: &str) -> Result<AtomId, X11Error> {
        self.check_alive(|reason| X11Error::AtomMapping {
            name: name.to_owned(),
            reason,
        })?;
        self.trip();

        if let Some(&atom) = self.atoms.borrow().get(name) {
            return Ok(atom);
        }

        let atom = AtomId(self.bump_atom());
        self.atoms.borrow_mut().insert(name.to_owned(), atom);
        self.names.borrow_mut().insert(atom, name.to_owned());
        Ok(atom)
    }

    fn lookup_name(&self, atom: AtomId) -> Result<Option<String>, X11Error> {
        self.check_alive(|reason| X11Error::AtomMapping {
            name: atom.to_string(),
            reason,
        })?;
        self.trip();

        Ok(self.names.borrow().get(&atom).cloned())
    }

    fn query_property(
        &self,
        window: WindowId,
        property: AtomId,
    ) -> Result<Option<RawProperty>, X11Error> {
        self.check_alive(|reason| X11Error::PropertyQuery { window, reason })?;
        self.trip();

        Ok(self.props.borrow().get(&(window, property)).cloned())
    }

    fn set_property(
        &self,
        window: WindowId,
        property: AtomId,
        value: &RawProperty,
    ) -> Result<(), X11Error> {
        self.check_alive(|reason| X11Error::PropertyChange { window, reason })?;
        self.trip();

        self.props
            .borrow_mut()
            .insert((window, property), value.clone());
        Ok(())
    }

    fn delete_property(&self, window: WindowId, property: AtomId) -> Result<(), X11Error> {
        self.check_alive(|reason| X11Error::PropertyChange { window, reason })?;
        self.trip();

        self.props.borrow_mut().remove(&(window, property));
        Ok(())
    }

    fn list_properties(&self, window: WindowId) -> Result<Vec<PropertyInfo>, X11Error> {
        self.check_alive(|reason| X11Error::PropertyQuery { window, reason })?;
        self.trip();

        Ok(self
            .props
            .borrow()
            .iter()
            .filter(|((win, _), _)| *win == window)
            .map(|((_, atom), raw)| PropertyInfo {
                atom: *atom,
                type_atom: raw.type_atom,
                format: raw.format,
                value_len: raw.value_len,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_counts_round_trips_and_severs() {
        let conn = FakeConnection::new();
        assert_eq!(conn.round_trips(), 0);

        let a = conn.intern_name("A").unwrap();
        let b = conn.intern_name("A").unwrap();
        assert_eq!(a, b);
        assert_eq!(conn.round_trips(), 2, "the fake itself never caches");

        conn.sever();
        assert!(conn.intern_name("B").is_err());
        conn.restore();
        assert!(conn.intern_name("B").is_ok());
    }
}
