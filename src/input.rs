//! Typed views over raw input event records.
//!
//! Button, key and pointer-motion records share most of their fields;
//! [`InputEvent`] wraps any of them behind one accessor surface instead of
//! an inheritance hierarchy. The wrappers own a copy of the raw record, are
//! immutable after construction and never talk to the server.

use bitflags::bitflags;

use x11rb::protocol::xproto::{
    ButtonPressEvent, KeyPressEvent, Motion, MotionNotifyEvent, Timestamp,
};

use crate::types::{Point, WindowId};

bitflags! {
    /// The decoded modifier/button state of an input event.
    ///
    /// Decoding keeps unknown bits, so `Modifiers::from_state(s).bits() == s`
    /// for every raw state value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u16 {
        const SHIFT   = 1 << 0;
        const LOCK    = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1    = 1 << 3;
        const MOD2    = 1 << 4;
        const MOD3    = 1 << 5;
        const MOD4    = 1 << 6;
        const MOD5    = 1 << 7;
        const BUTTON1 = 1 << 8;
        const BUTTON2 = 1 << 9;
        const BUTTON3 = 1 << 10;
        const BUTTON4 = 1 << 11;
        const BUTTON5 = 1 << 12;
        /// XKB keyboard group index, two bits wide.
        const XKB_GROUP_INDEX = (1 << 13) | (1 << 14);
        /// The protocol's AnyModifier wildcard.
        const ANY = 1 << 15;
    }
}

impl Modifiers {
    /// Decode a raw event state field. Lossless, including bits this crate
    /// does not name.
    pub fn from_state(state: u16) -> Self {
        Self::from_bits_retain(state)
    }

    /// The raw state bits, exactly as received.
    pub fn raw(self) -> u16 {
        self.bits()
    }
}

mod sealed {
    use x11rb::protocol::xproto::{ButtonPressEvent, KeyPressEvent, MotionNotifyEvent};

    pub trait Sealed {}
    impl Sealed for ButtonPressEvent {}
    impl Sealed for KeyPressEvent {}
    impl Sealed for MotionNotifyEvent {}
}

/// Field access shared by the raw input event records.
///
/// Sealed: the closed set of kinds is button, key and pointer motion.
pub trait InputRecord: sealed::Sealed {
    fn window(&self) -> WindowId;
    fn subwindow(&self) -> WindowId;
    fn root(&self) -> WindowId;
    fn pos(&self) -> Point;
    fn root_pos(&self) -> Point;
    fn time(&self) -> Timestamp;
    fn state(&self) -> u16;
}

macro_rules! input_record {
    ($record:ty) => {
        impl InputRecord for $record {
            fn window(&self) -> WindowId {
                WindowId(self.event)
            }

            fn subwindow(&self) -> WindowId {
                WindowId(self.child)
            }

            fn root(&self) -> WindowId {
                WindowId(self.root)
            }

            fn pos(&self) -> Point {
                Point::new(self.event_x, self.event_y)
            }

            fn root_pos(&self) -> Point {
                Point::new(self.root_x, self.root_y)
            }

            fn time(&self) -> Timestamp {
                self.time
            }

            fn state(&self) -> u16 {
                self.state.into()
            }
        }
    };
}

input_record!(ButtonPressEvent);
input_record!(KeyPressEvent);
input_record!(MotionNotifyEvent);

/// A typed, immutable view over one raw input event record.
#[derive(Debug, Clone)]
pub struct InputEvent<E: InputRecord> {
    raw: E,
}

impl<E: InputRecord> InputEvent<E> {
    pub fn new(raw: E) -> Self {
        Self { raw }
    }

    /// The window the event was reported relative to.
    pub fn window(&self) -> WindowId {
        self.raw.window()
    }

    /// The child of the event window the pointer was in, if any.
    pub fn subwindow(&self) -> WindowId {
        self.raw.subwindow()
    }

    /// The root window of the screen the event occurred on.
    pub fn root(&self) -> WindowId {
        self.raw.root()
    }

    /// Coordinates relative to the event window.
    pub fn pos(&self) -> Point {
        self.raw.pos()
    }

    /// Coordinates relative to the root window.
    pub fn root_pos(&self) -> Point {
        self.raw.root_pos()
    }

    /// Server timestamp of the event.
    pub fn time(&self) -> Timestamp {
        self.raw.time()
    }

    /// The decoded modifier set active when the event fired.
    pub fn modifiers(&self) -> Modifiers {
        Modifiers::from_state(self.raw.state())
    }

    pub fn raw(&self) -> &E {
        &self.raw
    }
}

impl<E: InputRecord> From<E> for InputEvent<E> {
    fn from(raw: E) -> Self {
        Self::new(raw)
    }
}

/// A button press or release. Release records share the press record type.
pub type ButtonEvent = InputEvent<ButtonPressEvent>;

impl ButtonEvent {
    /// Which pointer button fired, 1-based.
    pub fn button(&self) -> u8 {
        self.raw.detail
    }
}

/// A key press or release.
pub type KeyEvent = InputEvent<KeyPressEvent>;

impl KeyEvent {
    /// The raw keycode; symbol translation is keyboard-map territory.
    pub fn keycode(&self) -> u8 {
        self.raw.detail
    }
}

/// A pointer motion report.
pub type PointerMovedEvent = InputEvent<MotionNotifyEvent>;

impl PointerMovedEvent {
    /// Whether this is a coalesced motion hint rather than a full report.
    pub fn is_hint(&self) -> bool {
        self.raw.detail == Motion::HINT
    }
}
