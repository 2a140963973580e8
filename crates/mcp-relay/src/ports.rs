//! I/O capabilities the relay is driven through
//!
//! The relay never touches a serial port or the OS input queue directly.
//! The binary supplies real implementations; tests supply scripted ones.

use std::io;

use crate::error::InjectError;

/// Line-oriented connection to the hardware panel
pub trait PanelPort {
    /// Read the next complete record, without its terminator
    ///
    /// Blocks at most for the port's read timeout. Returns `Ok(None)` when
    /// no complete line arrived in that time.
    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>>;

    /// Write raw bytes to the panel
    fn write(&mut self, data: &[u8]) -> io::Result<()>;
}

/// Synthetic keyboard input
///
/// A press goes to whichever window has focus.
pub trait KeyInjector {
    /// Press and release one key
    fn press(&mut self, key: char) -> Result<(), InjectError>;
}

impl<K: KeyInjector + ?Sized> KeyInjector for Box<K> {
    fn press(&mut self, key: char) -> Result<(), InjectError> {
        (**self).press(key)
    }
}
