use thiserror::Error;

pub type Result<T> = std::result::Result<T, Chip8Error>;

/// Everything that can go wrong while loading or running a program.
///
/// Execution errors are reported for the cycle that raised them; the machine
/// state is left exactly as it was before that cycle.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("unknown opcode {opcode:#06X} at {addr:#05X}")]
    UnknownOpcode { opcode: u16, addr: u16 },
    #[error("stack overflow: CALL at {addr:#05X} with a full stack")]
    StackOverflow { addr: u16 },
    #[error("stack underflow: RET at {addr:#05X} with an empty stack")]
    StackUnderflow { addr: u16 },
    #[error("no font glyph for {index:#04X}")]
    OutOfBoundsFontIndex { index: u8 },
    #[error("rom is {len} bytes but only {capacity} fit in memory")]
    RomTooLarge { len: usize, capacity: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
