use std::fmt;

use rand::{Rng, RngCore};

use crate::constants::MEMORY_SIZE;
use crate::error::{Chip8Error, Result};
use crate::keypad::Keypad;
use crate::opcode::Opcode;
use crate::operations::*;
use crate::state::State;

/// A decoded opcode together with the operands it carries.
///
/// `x` and `y` are register indices, `kk` is an immediate byte, `addr` a 12-bit
/// address and `n` a sprite height.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Sys { addr: u16 },
    Cls,
    Ret,
    Jp { addr: u16 },
    Call { addr: u16 },
    Se { x: usize, kk: u8 },
    Sne { x: usize, kk: u8 },
    SeReg { x: usize, y: usize },
    Ld { x: usize, kk: u8 },
    Add { x: usize, kk: u8 },
    LdReg { x: usize, y: usize },
    Or { x: usize, y: usize },
    And { x: usize, y: usize },
    Xor { x: usize, y: usize },
    AddReg { x: usize, y: usize },
    Sub { x: usize, y: usize },
    Shr { x: usize, y: usize },
    Subn { x: usize, y: usize },
    Shl { x: usize, y: usize },
    SneReg { x: usize, y: usize },
    LdI { addr: u16 },
    JpV0 { addr: u16 },
    Rnd { x: usize, kk: u8 },
    Drw { x: usize, y: usize, n: u8 },
    Skp { x: usize },
    Sknp { x: usize },
    LdVxDt { x: usize },
    LdVxK { x: usize },
    LdDtVx { x: usize },
    LdStVx { x: usize },
    AddIVx { x: usize },
    LdFVx { x: usize },
    LdBVx { x: usize },
    LdIVx { x: usize },
    LdVxI { x: usize },
}

impl Instruction {
    /// Selects the correct Instruction for a given Opcode.
    ///
    /// The top nibble picks the class; classes 0, 8, E and F are further split on
    /// their low nibble or byte. Anything left over is an unknown opcode.
    pub fn decode(op: u16) -> std::result::Result<Self, u16> {
        let (x, y) = (op.x(), op.y());
        let instruction = match op.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Instruction::Cls,
            (0x0, 0x0, 0xE, 0xE) => Instruction::Ret,
            (0x0, ..) => Instruction::Sys { addr: op.addr() },
            (0x1, ..) => Instruction::Jp { addr: op.addr() },
            (0x2, ..) => Instruction::Call { addr: op.addr() },
            (0x3, ..) => Instruction::Se { x, kk: op.kk() },
            (0x4, ..) => Instruction::Sne { x, kk: op.kk() },
            (0x5, .., 0x0) => Instruction::SeReg { x, y },
            (0x6, ..) => Instruction::Ld { x, kk: op.kk() },
            (0x7, ..) => Instruction::Add { x, kk: op.kk() },
            (0x8, .., 0x0) => Instruction::LdReg { x, y },
            (0x8, .., 0x1) => Instruction::Or { x, y },
            (0x8, .., 0x2) => Instruction::And { x, y },
            (0x8, .., 0x3) => Instruction::Xor { x, y },
            (0x8, .., 0x4) => Instruction::AddReg { x, y },
            (0x8, .., 0x5) => Instruction::Sub { x, y },
            (0x8, .., 0x6) => Instruction::Shr { x, y },
            (0x8, .., 0x7) => Instruction::Subn { x, y },
            (0x8, .., 0xE) => Instruction::Shl { x, y },
            (0x9, .., 0x0) => Instruction::SneReg { x, y },
            (0xA, ..) => Instruction::LdI { addr: op.addr() },
            (0xB, ..) => Instruction::JpV0 { addr: op.addr() },
            (0xC, ..) => Instruction::Rnd { x, kk: op.kk() },
            (0xD, ..) => Instruction::Drw { x, y, n: op.n() },
            (0xE, _, 0x9, 0xE) => Instruction::Skp { x },
            (0xE, _, 0xA, 0x1) => Instruction::Sknp { x },
            (0xF, _, 0x0, 0x7) => Instruction::LdVxDt { x },
            (0xF, _, 0x0, 0xA) => Instruction::LdVxK { x },
            (0xF, _, 0x1, 0x5) => Instruction::LdDtVx { x },
            (0xF, _, 0x1, 0x8) => Instruction::LdStVx { x },
            (0xF, _, 0x1, 0xE) => Instruction::AddIVx { x },
            (0xF, _, 0x2, 0x9) => Instruction::LdFVx { x },
            (0xF, _, 0x3, 0x3) => Instruction::LdBVx { x },
            (0xF, _, 0x5, 0x5) => Instruction::LdIVx { x },
            (0xF, _, 0x6, 0x5) => Instruction::LdVxI { x },
            _ => return Err(op),
        };
        Ok(instruction)
    }

    /// Fetches and decodes the instruction at the current pc
    pub fn fetch(state: &State) -> Result<Self> {
        let op = state.fetch();
        Instruction::decode(op).map_err(|opcode| Chip8Error::UnknownOpcode {
            opcode,
            addr: state.pc,
        })
    }

    /// Runs the instruction against `state`, producing the next state.
    ///
    /// On error `state` is untouched and nothing about the failed cycle is kept.
    pub fn execute(
        self,
        state: &State,
        keypad: &Keypad,
        rng: &mut dyn RngCore,
    ) -> Result<State> {
        let next = match self {
            Instruction::Sys { addr } => sys(state, addr),
            Instruction::Cls => clr(state),
            Instruction::Ret => rts(state)?,
            Instruction::Jp { addr } => jump(state, addr),
            Instruction::Call { addr } => call(state, addr)?,
            Instruction::Se { x, kk } => ske(state, x, kk),
            Instruction::Sne { x, kk } => skne(state, x, kk),
            Instruction::SeReg { x, y } => skre(state, x, y),
            Instruction::Ld { x, kk } => load(state, x, kk),
            Instruction::Add { x, kk } => add(state, x, kk),
            Instruction::LdReg { x, y } => mv(state, x, y),
            Instruction::Or { x, y } => or(state, x, y),
            Instruction::And { x, y } => and(state, x, y),
            Instruction::Xor { x, y } => xor(state, x, y),
            Instruction::AddReg { x, y } => addr(state, x, y),
            Instruction::Sub { x, y } => sub(state, x, y),
            Instruction::Shr { x, y } => shr(state, x, y),
            Instruction::Subn { x, y } => subn(state, x, y),
            Instruction::Shl { x, y } => shl(state, x, y),
            Instruction::SneReg { x, y } => skrne(state, x, y),
            Instruction::LdI { addr } => loadi(state, addr),
            Instruction::JpV0 { addr } => jumpi(state, addr),
            Instruction::Rnd { x, kk } => rand(state, x, kk, rng.gen()),
            Instruction::Drw { x, y, n } => draw(state, x, y, n),
            Instruction::Skp { x } => skpr(state, x, keypad),
            Instruction::Sknp { x } => skup(state, x, keypad),
            Instruction::LdVxDt { x } => moved(state, x),
            Instruction::LdVxK { x } => keyd(state, x, keypad),
            Instruction::LdDtVx { x } => loads(state, x),
            Instruction::LdStVx { x } => ld(state, x),
            Instruction::AddIVx { x } => addi(state, x),
            Instruction::LdFVx { x } => ldspr(state, x)?,
            Instruction::LdBVx { x } => bcd(state, x),
            Instruction::LdIVx { x } => stor(state, x),
            Instruction::LdVxI { x } => read(state, x),
        };
        Ok(next)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Sys { addr } => write!(f, "SYS {:#05X}", addr),
            Instruction::Cls => write!(f, "CLS"),
            Instruction::Ret => write!(f, "RET"),
            Instruction::Jp { addr } => write!(f, "JP {:#05X}", addr),
            Instruction::Call { addr } => write!(f, "CALL {:#05X}", addr),
            Instruction::Se { x, kk } => write!(f, "SE V{:X}, {:#04X}", x, kk),
            Instruction::Sne { x, kk } => write!(f, "SNE V{:X}, {:#04X}", x, kk),
            Instruction::SeReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::Ld { x, kk } => write!(f, "LD V{:X}, {:#04X}", x, kk),
            Instruction::Add { x, kk } => write!(f, "ADD V{:X}, {:#04X}", x, kk),
            Instruction::LdReg { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Instruction::Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            Instruction::And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Instruction::Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Instruction::AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Instruction::Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            Instruction::Shr { x, y } => write!(f, "SHR V{:X}, V{:X}", x, y),
            Instruction::Subn { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Instruction::Shl { x, y } => write!(f, "SHL V{:X}, V{:X}", x, y),
            Instruction::SneReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::LdI { addr } => write!(f, "LD I, {:#05X}", addr),
            Instruction::JpV0 { addr } => write!(f, "JP V0, {:#05X}", addr),
            Instruction::Rnd { x, kk } => write!(f, "RND V{:X}, {:#04X}", x, kk),
            Instruction::Drw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Instruction::Skp { x } => write!(f, "SKP V{:X}", x),
            Instruction::Sknp { x } => write!(f, "SKNP V{:X}", x),
            Instruction::LdVxDt { x } => write!(f, "LD V{:X}, DT", x),
            Instruction::LdVxK { x } => write!(f, "LD V{:X}, K", x),
            Instruction::LdDtVx { x } => write!(f, "LD DT, V{:X}", x),
            Instruction::LdStVx { x } => write!(f, "LD ST, V{:X}", x),
            Instruction::AddIVx { x } => write!(f, "ADD I, V{:X}", x),
            Instruction::LdFVx { x } => write!(f, "LD F, V{:X}", x),
            Instruction::LdBVx { x } => write!(f, "LD B, V{:X}", x),
            Instruction::LdIVx { x } => write!(f, "LD [I], V{:X}", x),
            Instruction::LdVxI { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

/// Lists every 2 byte word of `rom` as if it were loaded at `origin`.
///
/// Words that don't decode are shown as raw data; a trailing odd byte is dropped.
/// Only the bytes that fit between `origin` and the end of memory are listed.
pub fn disassemble(rom: &[u8], origin: u16) -> Vec<String> {
    let origin = origin & 0x0FFF;
    let fits = rom.len().min(MEMORY_SIZE - origin as usize);
    rom[..fits]
        .chunks_exact(2)
        .enumerate()
        .map(|(index, word)| {
            let addr = origin.wrapping_add(2 * index as u16) & 0x0FFF;
            let op = u16::from(word[0]) << 8 | u16::from(word[1]);
            match Instruction::decode(op) {
                Ok(instruction) => format!("{:03X}: {:04X}  {}", addr, op, instruction),
                Err(_) => format!("{:03X}: {:04X}  DW {:#06X}", addr, op, op),
            }
        })
        .collect()
}
