pub use chip8::{Chip8, Step};
pub use clock::{Clock, Ticks};
pub use constants::{DEFAULT_CLOCK_HZ, DISPLAY_HEIGHT, DISPLAY_WIDTH, TIMER_HZ};
pub use error::{Chip8Error, Result};
pub use instruction::{disassemble, Instruction};
pub use keypad::Keypad;
pub use state::{FrameBuffer, State};

mod chip8;
mod clock;
pub mod constants;
mod error;
mod instruction;
mod keypad;
mod opcode;
mod operations;
pub mod state;
