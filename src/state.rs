use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_SET, FONT_START, MEMORY_SIZE, PROGRAM_START,
    REGISTER_COUNT, STACK_SIZE,
};

/// The FrameBuffer is indexed as [y][x]; every pixel is either 0 or 1
pub type FrameBuffer = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the carry/borrow/collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter, always pointing at a 2 byte instruction
///
/// Pointer
/// - (sp) index of the next free stack slot, in 0..=16
///
/// Timers
/// - 2 8-bit timers (delay & sound) that count down to 0 at 60Hz
///
/// ## Memory
/// - 16 entry stack of return addresses
///     - an entry holds the address of the CALL itself
/// - 4096 bytes of addressable memory; all addressing wraps
///     - 0x000..0x200 is reserved for the interpreter, and holds the sprite sheet
///     - 0x200.. is where ROMs are loaded
/// - 64x32 frame buffer
///     - stores the contents of the next frame to be drawn
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_SIZE],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        let font = FONT_START as usize;
        memory[font..font + FONT_SET.len()].copy_from_slice(&FONT_SET);

        State {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_SIZE],
            memory,
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            draw_flag: false,
        }
    }

    /// Gets the opcode currently pointed at by the pc.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    pub fn fetch(&self) -> u16 {
        let left = u16::from(self.read(self.pc));
        let right = u16::from(self.read(self.pc.wrapping_add(1)));
        left << 8 | right
    }

    /// Reads the byte at `addr`, wrapping around the end of memory
    pub fn read(&self, addr: u16) -> u8 {
        self.memory[addr as usize % MEMORY_SIZE]
    }

    /// Writes the byte at `addr`, wrapping around the end of memory
    pub fn write(&mut self, addr: u16, byte: u8) {
        self.memory[addr as usize % MEMORY_SIZE] = byte;
    }

    /// The pc of the instruction after this one
    pub fn next_pc(&self) -> u16 {
        self.pc.wrapping_add(0x2)
    }

    /// The pc of the instruction after the next one
    pub fn skip_pc(&self) -> u16 {
        self.pc.wrapping_add(0x4)
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
