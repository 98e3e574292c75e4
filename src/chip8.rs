use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::{MAX_SAVED_STATES, MEMORY_SIZE, PROGRAM_START};
use crate::error::{Chip8Error, Result};
use crate::instruction::Instruction;
use crate::keypad::Keypad;
use crate::state::{FrameBuffer, State};

/// What a call to `step_instruction` did
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// The instruction ran and the pc moved on
    Executed(Instruction),
    /// `LD Vx, K` found no key pressed; the same instruction runs again next cycle
    AwaitingKey,
}

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - `previous_states` for rewinding
///  - the `keypad` latch with public interfaces for manipulating it
///  - the random source used by `RND`
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing and reversing the CPU
/// - advancing its timers
/// - inspecting its frame buffer for rendering by some display
///
/// Nothing here keeps time. A driver calls `step_instruction` at its chosen clock
/// rate and `tick_timers` at 60Hz.
pub struct Chip8 {
    state: State,
    previous_states: VecDeque<State>,
    keypad: Keypad,
    rng: StdRng,
}

// TODO explore time/memory efficiency of more compact representations of past states (e.g. diffs)
impl Chip8 {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A Chip-8 whose `RND` results are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Chip8 {
            state: State::new(),
            previous_states: VecDeque::with_capacity(MAX_SAVED_STATES),
            keypad: Keypad::new(),
            rng,
        }
    }

    /// Puts the machine back into its power-on state; loaded programs are lost
    pub fn reset(&mut self) {
        self.state = State::new();
        self.previous_states.clear();
        self.keypad.release_all();
    }

    /// Load a rom from a source file
    ///
    /// # Arguments
    /// * `reader` a file reader that contains a ROM
    pub fn load_rom(&mut self, reader: &mut dyn std::io::Read) -> Result<()> {
        let mut rom = Vec::new();
        reader.read_to_end(&mut rom)?;
        self.load_bytes(&rom)
    }

    /// Copies a rom into memory at the program start
    pub fn load_bytes(&mut self, rom: &[u8]) -> Result<()> {
        let start = PROGRAM_START as usize;
        let capacity = MEMORY_SIZE - start;
        if rom.len() > capacity {
            return Err(Chip8Error::RomTooLarge {
                len: rom.len(),
                capacity,
            });
        }
        self.state.memory[start..start + rom.len()].copy_from_slice(rom);
        Ok(())
    }

    /// The current frame, regardless of whether it changed
    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Returns the FrameBuffer if the display should be redrawn and unsets the draw flag
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 4-bit representation of the key that was pressed
    pub fn key_press(&mut self, key: u8) {
        self.keypad.press(key);
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 4-bit representation of the key that was released
    pub fn key_release(&mut self, key: u8) {
        self.keypad.release(key);
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.keypad.set(key, pressed);
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// Advances the CPU by a single fetch-decode-execute cycle
    /// - gets, decodes and executes the next opcode
    /// - saves the previous state so it can be rewound
    /// - polls the keypad instead if awaiting a keypress
    ///
    /// An error leaves the state as it was before the cycle.
    pub fn step_instruction(&mut self) -> Result<Step> {
        let instruction = Instruction::fetch(&self.state)?;
        let next = instruction.execute(&self.state, &self.keypad, &mut self.rng)?;
        if matches!(instruction, Instruction::LdVxK { .. }) && next.pc == self.state.pc {
            return Ok(Step::AwaitingKey);
        }
        self.save_state();
        self.state = next;
        Ok(Step::Executed(instruction))
    }

    /// Reverses the CPU by a single cycle if possible
    /// - if there are previous_states, pops the last one and restores it
    pub fn rewind(&mut self) -> bool {
        match self.previous_states.pop_front() {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    /// Puts the current state in previous_states
    /// - if there are already MAX_SAVED_STATES saved then the oldest is dropped
    fn save_state(&mut self) {
        if self.previous_states.len() == MAX_SAVED_STATES {
            self.previous_states.pop_back();
        }
        self.previous_states.push_front(self.state);
    }

    /// Counts both timers down by one, stopping at 0
    pub fn tick_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.state.sound_timer
    }

    /// Whether a tone should currently be playing
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// A one line summary of the next opcode and the registers
    pub fn trace(&self) -> String {
        format!(
            "{:04X} v{:02X?} i{:04X} pc{:04X}",
            self.state.fetch(),
            self.state.v,
            self.state.i,
            self.state.pc
        )
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chip8_with(rom: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::with_seed(0);
        chip8.load_bytes(rom).unwrap();
        chip8
    }

    #[test]
    fn test_chip8_loads_rom_at_program_start() {
        let mut chip8 = Chip8::new();
        let mut reader: &[u8] = &[0xAA, 0xBB];
        chip8.load_rom(&mut reader).unwrap();
        assert_eq!(chip8.state.memory[0x200..0x202], [0xAA, 0xBB]);
        assert_eq!(chip8.state.fetch(), 0xAABB);
    }

    #[test]
    fn test_chip8_rejects_oversized_rom() {
        let mut chip8 = Chip8::new();
        let rom = vec![0; MEMORY_SIZE - 0x200 + 1];
        assert!(matches!(
            chip8.load_bytes(&rom),
            Err(Chip8Error::RomTooLarge { len: 3585, capacity: 3584 })
        ));
        assert!(chip8.load_bytes(&rom[1..]).is_ok());
    }

    #[test]
    fn test_steps_one_instruction() {
        // insert a cls opcode so there's something valid to run
        let mut chip8 = chip8_with(&[0x00, 0xE0]);
        let starting_pc = chip8.state.pc;
        let step = chip8.step_instruction().unwrap();
        assert_eq!(step, Step::Executed(Instruction::Cls));
        assert_eq!(chip8.state.pc, starting_pc + 0x2);
    }

    #[test]
    fn test_unknown_opcode_leaves_state_alone() {
        let mut chip8 = chip8_with(&[0xFF, 0xFF]);
        let before = chip8.state;
        assert!(matches!(
            chip8.step_instruction(),
            Err(Chip8Error::UnknownOpcode { opcode: 0xFFFF, addr: 0x200 })
        ));
        assert_eq!(chip8.state, before);
        assert!(chip8.previous_states.is_empty());
    }

    #[test]
    fn test_stack_underflow_leaves_state_alone() {
        let mut chip8 = chip8_with(&[0x00, 0xEE]);
        let before = chip8.state;
        assert!(chip8.step_instruction().is_err());
        assert_eq!(chip8.state, before);
    }

    #[test]
    fn test_call_then_ret() {
        // 200: CALL 206; 202: LD V0, 1; 206: RET
        let mut chip8 = chip8_with(&[0x22, 0x06, 0x60, 0x01, 0x00, 0x00, 0x00, 0xEE]);
        chip8.step_instruction().unwrap();
        assert_eq!(chip8.state.pc, 0x206);
        assert_eq!(chip8.state.sp, 1);
        chip8.step_instruction().unwrap();
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.state.sp, 0);
    }

    #[test]
    fn test_waits_for_key() {
        let mut chip8 = chip8_with(&[0xF3, 0x0A]);
        for _ in 0..3 {
            assert_eq!(chip8.step_instruction().unwrap(), Step::AwaitingKey);
            assert_eq!(chip8.state.pc, 0x200);
        }
        chip8.key_press(0x9);
        assert_eq!(
            chip8.step_instruction().unwrap(),
            Step::Executed(Instruction::LdVxK { x: 0x3 })
        );
        assert_eq!(chip8.state.v[0x3], 0x9);
        assert_eq!(chip8.state.pc, 0x202);
    }

    #[test]
    fn test_ticks_timers_down_to_zero() {
        let mut chip8 = Chip8::new();
        chip8.state.delay_timer = 2;
        chip8.state.sound_timer = 1;
        assert!(chip8.sound_active());
        chip8.tick_timers();
        assert_eq!(chip8.delay_timer(), 1);
        assert_eq!(chip8.sound_timer(), 0);
        assert!(!chip8.sound_active());
        chip8.tick_timers();
        chip8.tick_timers();
        assert_eq!(chip8.delay_timer(), 0);
        assert_eq!(chip8.sound_timer(), 0);
    }

    #[test]
    fn test_stepping_doesnt_touch_timers() {
        // 200: LD V0, 30; 202: LD DT, V0; 204: JP 204
        let mut chip8 = chip8_with(&[0x60, 0x1E, 0xF0, 0x15, 0x12, 0x04]);
        for _ in 0..100 {
            chip8.step_instruction().unwrap();
        }
        assert_eq!(chip8.delay_timer(), 30);
    }

    #[test]
    fn test_take_frame_clears_draw_flag() {
        let mut chip8 = chip8_with(&[0x00, 0xE0]);
        assert_eq!(chip8.take_frame(), None);
        chip8.step_instruction().unwrap();
        assert!(chip8.take_frame().is_some());
        assert_eq!(chip8.take_frame(), None);
    }

    #[test]
    fn test_rewind_restores_previous_state() {
        let mut chip8 = chip8_with(&[0x60, 0x05, 0x70, 0x03]);
        chip8.step_instruction().unwrap();
        chip8.step_instruction().unwrap();
        assert_eq!(chip8.state.v[0], 8);
        assert!(chip8.rewind());
        assert_eq!(chip8.state.v[0], 5);
        assert_eq!(chip8.state.pc, 0x202);
        assert!(chip8.rewind());
        assert!(!chip8.rewind());
        assert_eq!(chip8.state.pc, 0x200);
    }

    #[test]
    fn test_chip8_drops_old_saved_states() {
        let mut chip8 = Chip8::new();
        for _ in 0..MAX_SAVED_STATES {
            chip8.save_state();
        }
        assert_eq!(MAX_SAVED_STATES, chip8.previous_states.len());
        chip8.save_state();
        assert_eq!(MAX_SAVED_STATES, chip8.previous_states.len());
    }

    #[test]
    fn test_reset() {
        let mut chip8 = chip8_with(&[0x60, 0x05]);
        chip8.key_press(0x1);
        chip8.step_instruction().unwrap();
        chip8.reset();
        assert_eq!(chip8.state, State::new());
        assert_eq!(chip8.keypad().first_pressed(), None);
        assert!(!chip8.rewind());
    }

    #[test]
    fn test_trace() {
        let chip8 = chip8_with(&[0x60, 0x05]);
        assert!(chip8.trace().starts_with("6005 v[00, 00,"));
        assert!(chip8.trace().ends_with("i0000 pc0200"));
    }
}
