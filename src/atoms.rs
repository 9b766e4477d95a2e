//! Atom name resolution and caching.
//!
//! Atom mappings are immutable and cheap to retain, so the cache never
//! evicts. One [`AtomMapper`] lives in each [`crate::display::XDisplay`];
//! the two lookup directions are inserted together and stay mutually
//! derivable. There is no internal locking: a connection and its mapper are
//! a single-writer unit, serialized externally if shared across threads.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;
use x11rb::protocol::xproto::AtomEnum;

use crate::connection::ProtocolConnection;
use crate::display::XDisplay;
use crate::error::Result;
use crate::types::AtomId;

/// Bidirectional name/atom cache in front of the server's intern table.
#[derive(Debug, Default)]
pub struct AtomMapper {
    forward: RefCell<HashMap<String, AtomId>>,
    reverse: RefCell<HashMap<AtomId, String>>,
}

impl AtomMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a property or type name to its atom.
    ///
    /// A cache hit answers without a round trip; a miss interns the name on
    /// the server and caches the pair. Fails with `AtomMapping` if the
    /// server cannot complete the request; never silently returns
    /// [`AtomId::INVALID`].
    pub fn resolve<C: ProtocolConnection>(&self, conn: &C, name: &str) -> Result<AtomId> {
        if let Some(&atom) = self.forward.borrow().get(name) {
            return Ok(atom);
        }

        let atom = conn.intern_name(name)?;
        debug!("resolved atom {} for `{}`", atom, name);
        self.insert(name.to_owned(), atom);

        Ok(atom)
    }

    /// Reverse lookup of an atom's name, cache first, then server.
    ///
    /// `Ok(None)` means the atom carries no name on the server; that is a
    /// normal outcome, not an error.
    pub fn name_of<C: ProtocolConnection>(
        &self,
        conn: &C,
        atom: AtomId,
    ) -> Result<Option<String>> {
        if let Some(name) = self.reverse.borrow().get(&atom) {
            return Ok(Some(name.clone()));
        }

        match conn.lookup_name(atom)? {
            Some(name) => {
                debug!("resolved name `{}` for atom {}", name, atom);
                self.insert(name.clone(), atom);
                Ok(Some(name))
            }
            None => Ok(None),
        }
    }

    /// Name of `atom` if it is already cached; never issues a round trip.
    pub fn cached_name(&self, atom: AtomId) -> Option<String> {
        self.reverse.borrow().get(&atom).cloned()
    }

    fn insert(&self, name: String, atom: AtomId) {
        self.forward.borrow_mut().insert(name.clone(), atom);
        self.reverse.borrow_mut().insert(atom, name);
    }
}

/// A lazily-resolved, memoized single-atom reference.
///
/// Starts out unresolved, resolves through the display's mapper on first
/// [`CachedAtom::get`] and never changes afterwards. Only the first call can
/// fail. A resolved value is scoped to the connection it was resolved
/// against; do not reuse one instance across connections.
#[derive(Debug)]
pub struct CachedAtom {
    name: &'static str,
    slot: OnceLock<AtomId>,
}

impl CachedAtom {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The resolved atom, memoized after the first call.
    pub fn get<C: ProtocolConnection>(&self, display: &XDisplay<C>) -> Result<AtomId> {
        if let Some(&atom) = self.slot.get() {
            return Ok(atom);
        }

        let atom = display.resolve_atom(self.name)?;
        Ok(*self.slot.get_or_init(|| atom))
    }
}

/// Holds the well-known atoms the typed property layer relies on.
///
/// Predefined protocol atoms carry fixed identifiers and cost nothing; the
/// remaining names are interned once when the display context is created.
#[derive(Debug, Clone)]
pub struct Atoms {
    // Predefined type atoms.
    pub atom: AtomId,
    pub cardinal: AtomId,
    pub integer: AtomId,
    pub string: AtomId,
    pub window: AtomId,
    // Predefined ICCCM property names.
    pub wm_name: AtomId,
    pub wm_class: AtomId,
    pub wm_client_machine: AtomId,
    pub wm_command: AtomId,
    // Interned at startup.
    pub utf8_string: AtomId,
    pub wm_protocols: AtomId,
    pub wm_locale_name: AtomId,
    pub wm_client_leader: AtomId,
    pub net_wm_name: AtomId,
    pub net_wm_pid: AtomId,
    pub net_wm_desktop: AtomId,
    pub net_wm_window_type: AtomId,
}

impl Atoms {
    /// Intern all runtime-resolved atoms in one startup pass.
    pub fn new<C: ProtocolConnection>(conn: &C) -> Result<Self> {
        Ok(Self {
            atom: AtomEnum::ATOM.into(),
            cardinal: AtomEnum::CARDINAL.into(),
            integer: AtomEnum::INTEGER.into(),
            string: AtomEnum::STRING.into(),
            window: AtomEnum::WINDOW.into(),
            wm_name: AtomEnum::WM_NAME.into(),
            wm_class: AtomEnum::WM_CLASS.into(),
            wm_client_machine: AtomEnum::WM_CLIENT_MACHINE.into(),
            wm_command: AtomEnum::WM_COMMAND.into(),
            utf8_string: conn.intern_name("UTF8_STRING")?,
            wm_protocols: conn.intern_name("WM_PROTOCOLS")?,
            wm_locale_name: conn.intern_name("WM_LOCALE_NAME")?,
            wm_client_leader: conn.intern_name("WM_CLIENT_LEADER")?,
            net_wm_name: conn.intern_name("_NET_WM_NAME")?,
            net_wm_pid: conn.intern_name("_NET_WM_PID")?,
            net_wm_desktop: conn.intern_name("_NET_WM_DESKTOP")?,
            net_wm_window_type: conn.intern_name("_NET_WM_WINDOW_TYPE")?,
        })
    }
}
