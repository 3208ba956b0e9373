//! Frame-level scheduler tying the CPU, bus and save-state format
//! together into the surface a host application actually drives: load
//! a ROM, run frames, feed input, pull out pixels and audio.

use crate::cartridge::Cartridge;
use crate::cpu::Cpu;
use crate::error::Error;
use crate::mmu::Mmu;
use crate::pad::PadKey;
use crate::state::{decode_container, encode_container, StateComponent};

pub struct Emulator {
    cpu: Cpu,
}

impl Emulator {
    /// Builds a fresh emulator from a ROM image, with registers and I/O
    /// already at the post-boot state (no boot ROM is modeled).
    pub fn new(rom: &[u8]) -> Self {
        let cartridge = Cartridge::from_data(rom);
        let mut cpu = Cpu::new(Mmu::new(cartridge));
        cpu.boot();
        Self { cpu }
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
        self.cpu.boot();
    }

    /// Runs CPU steps until the PPU completes exactly one frame.
    pub fn run_frame(&mut self) {
        let start_frame = self.cpu.mmu().ppu().frame_index();
        while self.cpu.mmu().ppu().frame_index() == start_frame {
            self.cpu.step();
        }
    }

    pub fn run_frames(&mut self, count: u32) {
        for _ in 0..count {
            self.run_frame();
        }
    }

    pub fn press_button(&mut self, key: PadKey) {
        self.cpu.mmu_mut().pad_mut().press_button(key);
    }

    pub fn release_button(&mut self, key: PadKey) {
        self.cpu.mmu_mut().pad_mut().release_button(key);
    }

    /// Holds a key for exactly `frames` frames, releasing it
    /// afterwards — the common "tap a button" pattern for scripted
    /// input and test ROMs.
    pub fn press_button_for_frames(&mut self, key: PadKey, frames: u32) {
        self.press_button(key);
        self.run_frames(frames);
        self.release_button(key);
    }

    pub fn frame_buffer(&self) -> &[u8] {
        self.cpu.mmu().ppu().frame_buffer()
    }

    pub fn set_audio_output_enabled(&mut self, enabled: bool) {
        self.cpu.mmu_mut().apu_mut().set_audio_output_enabled(enabled);
    }

    /// Drains up to `max_frames` stereo audio frames (interleaved L/R
    /// `f32` samples in [-1, 1]) produced since the last call.
    pub fn consume_audio_samples(&mut self, max_frames: usize) -> Vec<f32> {
        self.cpu.mmu_mut().apu_mut().consume_samples(max_frames)
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mmu = self.cpu.mmu();
        encode_container([
            self.cpu.state(),
            mmu.state(),
            mmu.ppu().state(),
            mmu.timer().state(),
            Vec::new(), // pad carries no meaningful cross-session state
            mmu.cartridge().state(),
            mmu.apu().state(),
        ])
    }

    pub fn deserialize(&mut self, data: &[u8]) -> Result<(), Error> {
        let slices = decode_container(data)?;
        self.cpu.set_state(slices[0])?;
        self.cpu.mmu_mut().set_state(slices[1])?;
        self.cpu.mmu_mut().ppu_mut().set_state(slices[2])?;
        self.cpu.mmu_mut().timer_mut().set_state(slices[3])?;
        // pad state (slot 4) is intentionally not restored: re-pressing
        // whatever the host's input devices currently report is more
        // correct than resurrecting stale button state from a snapshot.
        self.cpu.mmu_mut().cartridge_mut().set_state(slices[5])?;
        self.cpu.mmu_mut().apu_mut().set_state(slices[6])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_rom() -> Vec<u8> {
        let mut rom = vec![0u8; 0x8000];
        rom[0x0147] = 0x00;
        rom
    }

    #[test]
    fn test_boot_sets_post_boot_pc() {
        let emulator = Emulator::new(&blank_rom());
        assert_eq!(emulator.frame_buffer().len(), 160 * 144 * 4);
    }

    #[test]
    fn test_run_frame_advances_frame_index() {
        let mut emulator = Emulator::new(&blank_rom());
        let before = emulator.cpu.mmu().ppu().frame_index();
        emulator.run_frame();
        assert!(emulator.cpu.mmu().ppu().frame_index() > before);
    }

    #[test]
    fn test_press_button_for_frames_releases_after() {
        let mut emulator = Emulator::new(&blank_rom());
        emulator.press_button_for_frames(PadKey::A, 1);
        assert_eq!(emulator.cpu.mmu_mut().pad_mut().read() & 0x01, 0x01);
    }

    #[test]
    fn test_cpu_state_roundtrips_through_container() {
        let mut emulator = Emulator::new(&blank_rom());
        emulator.run_frames(1);
        let snapshot = emulator.serialize();
        let mut restored = Emulator::new(&blank_rom());
        restored.deserialize(&snapshot).unwrap();
    }
}
