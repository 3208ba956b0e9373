//! Timer/divider circuit.
//!
//! Modeled as a single free-running 16-bit system counter (DIV is just
//! its upper byte) with TIMA incrementing on the falling edge of one of
//! its bits, selected by TAC. This is the real DMG circuit rather than a
//! simplified "increment every N cycles" approximation, so that DIV
//! writes and TAC reconfiguration reproduce the glitch increments real
//! games rely on.

use crate::state::{read_bool, read_u16, read_u8, write_bool, write_u16, write_u8, StateComponent};
use crate::error::Error;
use std::io::Cursor;

/// Bit of the system counter that feeds TIMA, indexed by TAC's low 2
/// bits (00, 01, 10, 11 -> 4096Hz, 262144Hz, 65536Hz, 16384Hz).
const SELECT_BITS: [u8; 4] = [9, 3, 5, 7];

pub struct Timer {
    system_counter: u16,
    tima: u8,
    tma: u8,
    tac: u8,
    /// Set for the four T-cycles between a TIMA overflow and TIMA/IF
    /// actually reloading from TMA.
    reload_pending: bool,
    reload_delay: u8,
    int_timer: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            system_counter: 0,
            tima: 0,
            tma: 0,
            tac: 0,
            reload_pending: false,
            reload_delay: 0,
            int_timer: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn enabled(&self) -> bool {
        self.tac & 0x04 != 0
    }

    fn select_bit(&self) -> u8 {
        SELECT_BITS[(self.tac & 0x03) as usize]
    }

    fn signal(&self) -> bool {
        self.enabled() && (self.system_counter >> self.select_bit()) & 0x01 != 0
    }

    /// Advances the circuit by `cycles` T-cycles, returning whether a
    /// TIMA-overflow interrupt should be latched into IF this step.
    pub fn tick(&mut self, cycles: u16) -> bool {
        let mut fired = false;
        for _ in 0..cycles {
            if self.reload_pending {
                self.reload_delay -= 1;
                if self.reload_delay == 0 {
                    self.reload_pending = false;
                    self.tima = self.tma;
                    fired = true;
                }
            }

            let before = self.signal();
            self.system_counter = self.system_counter.wrapping_add(1);
            let after = self.signal();

            if before && !after {
                self.increment_tima();
            }
        }
        if fired {
            self.int_timer = true;
        }
        self.int_timer
    }

    pub fn is_interrupt_requested(&mut self) -> bool {
        let pending = self.int_timer;
        self.int_timer = false;
        pending
    }

    fn increment_tima(&mut self) {
        let (next, overflow) = self.tima.overflowing_add(1);
        self.tima = next;
        if overflow {
            // the real reload doesn't happen for another four T-cycles;
            // a write to TIMA or TMA in that window can still change
            // the outcome.
            self.reload_pending = true;
            self.reload_delay = 4;
        }
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            crate::consts::DIV_ADDR => (self.system_counter >> 8) as u8,
            crate::consts::TIMA_ADDR => self.tima,
            crate::consts::TMA_ADDR => self.tma,
            crate::consts::TAC_ADDR => (self.tac & 0x07) | 0xf8,
            _ => 0xff,
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            crate::consts::DIV_ADDR => {
                let before = self.signal();
                self.system_counter = 0;
                let after = self.signal();
                if before && !after {
                    self.increment_tima();
                }
            }
            crate::consts::TIMA_ADDR => {
                // a write during the reload-delay window cancels the
                // pending reload outright.
                self.reload_pending = false;
                self.tima = value;
            }
            crate::consts::TMA_ADDR => {
                self.tma = value;
                if self.reload_pending {
                    // the reload hasn't happened yet, so it picks up
                    // this new value when it fires.
                    self.tima = value;
                }
            }
            crate::consts::TAC_ADDR => {
                let before = self.signal();
                self.tac = value & 0x07;
                let after = self.signal();
                if before && !after {
                    self.increment_tima();
                }
            }
            _ => (),
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl StateComponent for Timer {
    fn state(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_u16(&mut out, self.system_counter);
        write_u8(&mut out, self.tima);
        write_u8(&mut out, self.tma);
        write_u8(&mut out, self.tac);
        write_bool(&mut out, self.reload_pending);
        write_u8(&mut out, self.reload_delay);
        write_bool(&mut out, self.int_timer);
        out
    }

    fn set_state(&mut self, data: &[u8]) -> Result<(), Error> {
        let mut cursor = Cursor::new(data);
        self.system_counter = read_u16("timer", &mut cursor)?;
        self.tima = read_u8("timer", &mut cursor)?;
        self.tma = read_u8("timer", &mut cursor)?;
        self.tac = read_u8("timer", &mut cursor)?;
        self.reload_pending = read_bool("timer", &mut cursor)?;
        self.reload_delay = read_u8("timer", &mut cursor)?;
        self.int_timer = read_bool("timer", &mut cursor)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{TAC_ADDR, TIMA_ADDR, TMA_ADDR};

    #[test]
    fn test_tima_increments_on_falling_edge() {
        let mut timer = Timer::new();
        timer.write(TAC_ADDR, 0x05); // enabled, 262144Hz -> bit 3
        // tick enough cycles to flip bit 3 high then low once
        timer.tick(8); // bit3 set at counter=8
        assert_eq!(timer.tima, 0);
        timer.tick(8); // counter=16, bit3 falls -> increments
        assert_eq!(timer.tima, 1);
    }

    #[test]
    fn test_tima_overflow_reload_delay() {
        let mut timer = Timer::new();
        timer.tima = 0xff;
        timer.tma = 0x12;
        timer.write(TAC_ADDR, 0x05);
        // force an immediate overflow by direct increment
        timer.increment_tima();
        assert!(timer.reload_pending);
        assert_eq!(timer.tima, 0x00);
        // four T-cycles of ticking with the bit held low won't toggle
        // further increments, so we can observe the delay countdown
        let fired = timer.tick(4);
        assert!(fired);
        assert_eq!(timer.tima, 0x12);
    }

    #[test]
    fn test_tima_write_during_delay_cancels_reload() {
        let mut timer = Timer::new();
        timer.tima = 0xff;
        timer.tma = 0x12;
        timer.increment_tima();
        assert!(timer.reload_pending);
        timer.write(TIMA_ADDR, 0x05);
        assert!(!timer.reload_pending);
        assert_eq!(timer.tima, 0x05);
    }

    #[test]
    fn test_tma_write_during_delay_is_reflected() {
        let mut timer = Timer::new();
        timer.tima = 0xff;
        timer.tma = 0x12;
        timer.write(TAC_ADDR, 0x05);
        timer.increment_tima();
        timer.write(TMA_ADDR, 0x34);
        let fired = timer.tick(4);
        assert!(fired);
        assert_eq!(timer.tima, 0x34);
    }

    #[test]
    fn test_div_write_resets_counter_and_masks_tac() {
        let mut timer = Timer::new();
        timer.write(TAC_ADDR, 0xff);
        assert_eq!(timer.read(TAC_ADDR), 0xff);
        timer.write(crate::consts::DIV_ADDR, 0x00);
        assert_eq!(timer.system_counter, 0);
    }

    #[test]
    fn test_state_roundtrip() {
        let mut timer = Timer::new();
        timer.tick(1234);
        timer.tima = 0x42;
        let snapshot = timer.state();
        let mut restored = Timer::new();
        restored.set_state(&snapshot).unwrap();
        assert_eq!(restored.tima, 0x42);
        assert_eq!(restored.system_counter, timer.system_counter);
    }
}
