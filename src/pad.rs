//! Joypad (P1/JOYP) emulation.

use crate::error::Error;
use crate::state::{read_bool, read_u8, write_bool, write_u8, StateComponent};
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadKey {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    Select,
    Start,
}

pub struct Pad {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    a: bool,
    b: bool,
    select: bool,
    start: bool,

    /// Bits 5-4 of P1, the only bits a write can change.
    selection: u8,
    /// Lower nibble as it was after the last `read()`, used to detect
    /// high-to-low transitions when a key is pressed.
    last_nibble: u8,
    interrupt_pending: bool,
}

impl Pad {
    pub fn new() -> Self {
        Self {
            up: false,
            down: false,
            left: false,
            right: false,
            a: false,
            b: false,
            select: false,
            start: false,
            selection: 0x30,
            last_nibble: 0x0f,
            interrupt_pending: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn press_button(&mut self, key: PadKey) {
        self.set_key(key, true);
    }

    pub fn release_button(&mut self, key: PadKey) {
        self.set_key(key, false);
    }

    fn set_key(&mut self, key: PadKey, pressed: bool) {
        match key {
            PadKey::Up => self.up = pressed,
            PadKey::Down => self.down = pressed,
            PadKey::Left => self.left = pressed,
            PadKey::Right => self.right = pressed,
            PadKey::A => self.a = pressed,
            PadKey::B => self.b = pressed,
            PadKey::Select => self.select = pressed,
            PadKey::Start => self.start = pressed,
        }
        self.refresh_nibble();
    }

    /// Lower nibble the current selection would expose, OR'd with 0xF
    /// entirely when neither group is selected (bits read high == not
    /// pressed).
    fn compute_nibble(&self) -> u8 {
        let direction_selected = self.selection & 0x10 == 0;
        let action_selected = self.selection & 0x20 == 0;

        if !direction_selected && !action_selected {
            return 0x0f;
        }

        let mut nibble = 0x0f;
        if direction_selected {
            if self.right {
                nibble &= !0x01;
            }
            if self.left {
                nibble &= !0x02;
            }
            if self.up {
                nibble &= !0x04;
            }
            if self.down {
                nibble &= !0x08;
            }
        }
        if action_selected {
            if self.a {
                nibble &= !0x01;
            }
            if self.b {
                nibble &= !0x02;
            }
            if self.select {
                nibble &= !0x04;
            }
            if self.start {
                nibble &= !0x08;
            }
        }
        nibble
    }

    /// Recomputes the lower nibble and latches an interrupt if any line
    /// just transitioned high to low (a press, never a release).
    fn refresh_nibble(&mut self) {
        let nibble = self.compute_nibble();
        let fell = self.last_nibble & !nibble;
        if fell != 0 {
            self.interrupt_pending = true;
        }
        self.last_nibble = nibble;
    }

    pub fn read(&self) -> u8 {
        0xc0 | (self.selection & 0x30) | self.last_nibble
    }

    pub fn write(&mut self, value: u8) {
        self.selection = value & 0x30;
        self.refresh_nibble();
    }

    pub fn is_interrupt_requested(&mut self) -> bool {
        let pending = self.interrupt_pending;
        self.interrupt_pending = false;
        pending
    }
}

impl Default for Pad {
    fn default() -> Self {
        Self::new()
    }
}

impl StateComponent for Pad {
    fn state(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_bool(&mut out, self.up);
        write_bool(&mut out, self.down);
        write_bool(&mut out, self.left);
        write_bool(&mut out, self.right);
        write_bool(&mut out, self.a);
        write_bool(&mut out, self.b);
        write_bool(&mut out, self.select);
        write_bool(&mut out, self.start);
        write_u8(&mut out, self.selection);
        write_u8(&mut out, self.last_nibble);
        write_bool(&mut out, self.interrupt_pending);
        out
    }

    fn set_state(&mut self, data: &[u8]) -> Result<(), Error> {
        let mut cursor = Cursor::new(data);
        self.up = read_bool("pad", &mut cursor)?;
        self.down = read_bool("pad", &mut cursor)?;
        self.left = read_bool("pad", &mut cursor)?;
        self.right = read_bool("pad", &mut cursor)?;
        self.a = read_bool("pad", &mut cursor)?;
        self.b = read_bool("pad", &mut cursor)?;
        self.select = read_bool("pad", &mut cursor)?;
        self.start = read_bool("pad", &mut cursor)?;
        self.selection = read_u8("pad", &mut cursor)?;
        self.last_nibble = read_u8("pad", &mut cursor)?;
        self.interrupt_pending = read_bool("pad", &mut cursor)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_selection_reads_low_nibble_high() {
        let pad = Pad::new();
        assert_eq!(pad.read() & 0x0f, 0x0f);
    }

    #[test]
    fn test_press_latches_interrupt_release_does_not() {
        let mut pad = Pad::new();
        pad.write(0x10); // select action buttons
        assert!(!pad.is_interrupt_requested());
        pad.press_button(PadKey::A);
        assert!(pad.is_interrupt_requested());
        assert!(!pad.is_interrupt_requested());
        pad.release_button(PadKey::A);
        assert!(!pad.is_interrupt_requested());
    }

    #[test]
    fn test_read_format() {
        let mut pad = Pad::new();
        pad.write(0x10);
        pad.press_button(PadKey::A);
        assert_eq!(pad.read(), 0xc0 | 0x10 | 0x0e);
    }
}
