//! Synthetic key presses
//!
//! On Windows keys are sent with `SendInput` as hardware scan codes, which
//! DirectInput games (X-Plane included) read the same way as a physical
//! keyboard. Other platforms get a dry-run injector that only logs.

use mcp_relay::{InjectError, KeyInjector};
use tracing::info;

/// Set 1 scan code for a key on a US keyboard
pub fn scan_code(key: char) -> Option<u16> {
    let code = match key {
        '1' => 0x02,
        '2' => 0x03,
        '3' => 0x04,
        '4' => 0x05,
        '5' => 0x06,
        '6' => 0x07,
        '7' => 0x08,
        '8' => 0x09,
        '9' => 0x0A,
        '0' => 0x0B,
        '-' => 0x0C,
        '=' => 0x0D,
        'q' => 0x10,
        'w' => 0x11,
        'e' => 0x12,
        'r' => 0x13,
        't' => 0x14,
        'y' => 0x15,
        'u' => 0x16,
        'i' => 0x17,
        'o' => 0x18,
        'p' => 0x19,
        '[' => 0x1A,
        ']' => 0x1B,
        'a' => 0x1E,
        's' => 0x1F,
        'd' => 0x20,
        'f' => 0x21,
        'g' => 0x22,
        'h' => 0x23,
        'j' => 0x24,
        'k' => 0x25,
        'l' => 0x26,
        ';' => 0x27,
        '\'' => 0x28,
        '`' => 0x29,
        '\\' => 0x2B,
        'z' => 0x2C,
        'x' => 0x2D,
        'c' => 0x2E,
        'v' => 0x2F,
        'b' => 0x30,
        'n' => 0x31,
        'm' => 0x32,
        ',' => 0x33,
        '.' => 0x34,
        '/' => 0x35,
        ' ' => 0x39,
        _ => return None,
    };
    Some(code)
}

/// Presses keys through the Windows input queue
#[cfg(windows)]
pub struct ScanCodeInjector;

#[cfg(windows)]
impl KeyInjector for ScanCodeInjector {
    fn press(&mut self, key: char) -> Result<(), InjectError> {
        let code = scan_code(key).ok_or_else(|| InjectError {
            key,
            reason: "no scan code for key".into(),
        })?;

        win::send_scan_code(code).map_err(|e| InjectError {
            key,
            reason: e.to_string(),
        })?;
        tracing::debug!("Pressed {:?} (scan code 0x{:02X})", key, code);
        Ok(())
    }
}

#[cfg(windows)]
mod win {
    use std::io;
    use std::mem::size_of;

    use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
        SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP,
        KEYEVENTF_SCANCODE,
    };

    fn key_input(code: u16, flags: KEYBD_EVENT_FLAGS) -> INPUT {
        INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: 0,
                    wScan: code,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        }
    }

    /// Key down followed by key up
    pub fn send_scan_code(code: u16) -> io::Result<()> {
        let inputs = [
            key_input(code, KEYEVENTF_SCANCODE),
            key_input(code, KEYEVENTF_SCANCODE | KEYEVENTF_KEYUP),
        ];

        // SAFETY: `inputs` is a live array of fully initialized INPUT values
        // and cbsize matches the element type.
        let sent = unsafe {
            SendInput(
                inputs.len() as u32,
                inputs.as_ptr(),
                size_of::<INPUT>() as i32,
            )
        };

        if sent as usize != inputs.len() {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// Logs key presses instead of sending them
#[derive(Debug, Default)]
pub struct DryRunInjector {
    pressed: usize,
}

impl DryRunInjector {
    /// Number of presses logged so far
    pub fn pressed(&self) -> usize {
        self.pressed
    }
}

impl KeyInjector for DryRunInjector {
    fn press(&mut self, key: char) -> Result<(), InjectError> {
        let code = scan_code(key).ok_or_else(|| InjectError {
            key,
            reason: "no scan code for key".into(),
        })?;
        self.pressed += 1;
        info!("[dry run] press {:?} (scan code 0x{:02X})", key, code);
        Ok(())
    }
}

/// Injector for this platform, or the dry-run one when asked for
pub fn platform_injector(dry_run: bool) -> Box<dyn KeyInjector> {
    if dry_run {
        info!("Dry run: key presses will be logged, not sent");
        return Box::new(DryRunInjector::default());
    }

    #[cfg(windows)]
    {
        Box::new(ScanCodeInjector)
    }

    #[cfg(not(windows))]
    {
        tracing::warn!("Key injection is only supported on Windows; key presses will be logged");
        Box::new(DryRunInjector::default())
    }
}
