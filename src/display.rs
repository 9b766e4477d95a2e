//! Connection-scoped display context.
//!
//! [`XDisplay`] bundles what every typed operation needs: the protocol
//! connection, the atom cache and the interned well-known atoms. It is
//! explicit state with the connection's lifetime, created with it and
//! dropped with it, passed by reference to everything downstream. Sharing
//! one context across threads requires external serialization (one mutex
//! around the whole unit); the crate takes no locks of its own.

use tracing::info;
use x11rb::rust_connection::RustConnection;

use crate::atoms::{AtomMapper, Atoms};
use crate::connection::ProtocolConnection;
use crate::error::{Result, X11Error};
use crate::types::{AtomId, WindowId};
use crate::window::XWindow;

/// The connection context all typed operations run against.
pub struct XDisplay<C: ProtocolConnection> {
    conn: C,
    mapper: AtomMapper,
    atoms: Atoms,
}

impl<C: ProtocolConnection> XDisplay<C> {
    /// Wrap an established connection, interning the well-known atoms.
    pub fn new(conn: C) -> Result<Self> {
        let atoms = Atoms::new(&conn)?;
        Ok(Self {
            conn,
            mapper: AtomMapper::new(),
            atoms,
        })
    }

    /// Handle for property operations on one window.
    pub fn window(&self, id: WindowId) -> XWindow<'_, C> {
        XWindow::new(self, id)
    }

    /// Resolve a name to its atom via the connection-scoped cache.
    pub fn resolve_atom(&self, name: &str) -> Result<AtomId> {
        self.mapper.resolve(&self.conn, name)
    }

    /// Reverse lookup of an atom's name via the cache.
    pub fn atom_name(&self, atom: AtomId) -> Result<Option<String>> {
        self.mapper.name_of(&self.conn, atom)
    }

    pub fn conn(&self) -> &C {
        &self.conn
    }

    pub fn atoms(&self) -> &Atoms {
        &self.atoms
    }

    pub fn mapper(&self) -> &AtomMapper {
        &self.mapper
    }
}

impl XDisplay<RustConnection> {
    /// Connect to the X server named by `dpy_name`, or `$DISPLAY` if `None`.
    ///
    /// Returns the context and the preferred screen number.
    pub fn connect(dpy_name: Option<&str>) -> Result<(Self, usize)> {
        let (conn, screen_num) =
            x11rb::connect(dpy_name).map_err(|e| X11Error::Connect(e.to_string()))?;
        info!("connected to X server (screen {})", screen_num);

        Ok((Self::new(conn)?, screen_num))
    }
}
