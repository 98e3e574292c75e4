use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FLAG_REGISTER, FONT_GLYPH_SIZE, FONT_START, STACK_SIZE,
};
use crate::error::{Chip8Error, Result};
use crate::keypad::Keypad;
use crate::state::State;

/// pc = addr
/// Machine code routines aren't emulated so this behaves like a jump
pub fn sys(state: &State, addr: u16) -> State {
    State { pc: addr, ..*state }
}

/// clear
pub fn clr(state: &State) -> State {
    State {
        pc: state.next_pc(),
        frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        draw_flag: true,
        ..*state
    }
}

/// PC = STACK.pop()
/// The stack holds the address of the CALL so we step past it
pub fn rts(state: &State) -> Result<State> {
    if state.sp == 0 {
        return Err(Chip8Error::StackUnderflow { addr: state.pc });
    }
    let sp = state.sp - 0x1;
    Ok(State {
        pc: state.stack[sp as usize].wrapping_add(0x2),
        sp,
        ..*state
    })
}

/// PC = addr
pub fn jump(state: &State, addr: u16) -> State {
    State { pc: addr, ..*state }
}

/// STACK.push(PC); PC = addr
pub fn call(state: &State, addr: u16) -> Result<State> {
    if state.sp as usize >= STACK_SIZE {
        return Err(Chip8Error::StackOverflow { addr: state.pc });
    }
    let mut stack = state.stack;
    stack[state.sp as usize] = state.pc;
    Ok(State {
        pc: addr,
        sp: state.sp + 0x1,
        stack,
        ..*state
    })
}

/// Skips the next instruction when `condition` holds
fn skip_if(state: &State, condition: bool) -> State {
    let pc = if condition {
        state.skip_pc()
    } else {
        state.next_pc()
    };
    State { pc, ..*state }
}

/// if Vx == kk then pc += 2
pub fn ske(state: &State, x: usize, kk: u8) -> State {
    skip_if(state, state.v[x] == kk)
}

/// if Vx != kk then pc += 2
pub fn skne(state: &State, x: usize, kk: u8) -> State {
    skip_if(state, state.v[x] != kk)
}

/// if Vx == Vy then pc += 2
pub fn skre(state: &State, x: usize, y: usize) -> State {
    skip_if(state, state.v[x] == state.v[y])
}

/// Vx = kk
pub fn load(state: &State, x: usize, kk: u8) -> State {
    let mut v = state.v;
    v[x] = kk;
    State {
        pc: state.next_pc(),
        v,
        ..*state
    }
}

/// Vx += kk
/// Add kk to Vx; allow for overflow but implicitly drop it
pub fn add(state: &State, x: usize, kk: u8) -> State {
    let mut v = state.v;
    v[x] = v[x].wrapping_add(kk);
    State {
        pc: state.next_pc(),
        v,
        ..*state
    }
}

/// Applies `f` to (Vx, Vy) and stores the result in Vx
fn alu(state: &State, x: usize, y: usize, f: impl Fn(u8, u8) -> u8) -> State {
    let mut v = state.v;
    v[x] = f(v[x], v[y]);
    State {
        pc: state.next_pc(),
        v,
        ..*state
    }
}

/// Applies `f` to (Vx, Vy), storing the flag in VF and then the result in Vx
fn alu_flagged(state: &State, x: usize, y: usize, f: impl Fn(u8, u8) -> (u8, bool)) -> State {
    let (res, flag) = f(state.v[x], state.v[y]);
    let mut v = state.v;
    v[FLAG_REGISTER] = u8::from(flag);
    v[x] = res;
    State {
        pc: state.next_pc(),
        v,
        ..*state
    }
}

/// Vx = Vy
pub fn mv(state: &State, x: usize, y: usize) -> State {
    alu(state, x, y, |_, vy| vy)
}

/// Vx |= Vy
pub fn or(state: &State, x: usize, y: usize) -> State {
    alu(state, x, y, |vx, vy| vx | vy)
}

/// Vx &= Vy
pub fn and(state: &State, x: usize, y: usize) -> State {
    alu(state, x, y, |vx, vy| vx & vy)
}

/// Vx ^= Vy
pub fn xor(state: &State, x: usize, y: usize) -> State {
    alu(state, x, y, |vx, vy| vx ^ vy)
}

/// Vx += Vy; VF = overflow
pub fn addr(state: &State, x: usize, y: usize) -> State {
    alu_flagged(state, x, y, |vx, vy| vx.overflowing_add(vy))
}

/// Vx -= Vy; VF = !underflow
pub fn sub(state: &State, x: usize, y: usize) -> State {
    alu_flagged(state, x, y, |vx, vy| (vx.wrapping_sub(vy), vx >= vy))
}

/// Vx >>= 1; VF = the bit shifted out
pub fn shr(state: &State, x: usize, y: usize) -> State {
    alu_flagged(state, x, y, |vx, _| (vx >> 1, vx & 0x1 == 0x1))
}

/// Vx = Vy - Vx; VF = !underflow
pub fn subn(state: &State, x: usize, y: usize) -> State {
    alu_flagged(state, x, y, |vx, vy| (vy.wrapping_sub(vx), vy >= vx))
}

/// Vx <<= 1; VF = the bit shifted out
pub fn shl(state: &State, x: usize, y: usize) -> State {
    alu_flagged(state, x, y, |vx, _| (vx << 1, (vx >> 7) & 0x1 == 0x1))
}

/// if Vx != Vy then pc += 2
pub fn skrne(state: &State, x: usize, y: usize) -> State {
    skip_if(state, state.v[x] != state.v[y])
}

/// I = addr
pub fn loadi(state: &State, addr: u16) -> State {
    State {
        pc: state.next_pc(),
        i: addr,
        ..*state
    }
}

/// PC = V0 + addr
/// The target wraps to stay inside the 12-bit address space
pub fn jumpi(state: &State, addr: u16) -> State {
    State {
        pc: (u16::from(state.v[0x0]) + addr) & 0x0FFF,
        ..*state
    }
}

/// Vx = rand_byte & kk
pub fn rand(state: &State, x: usize, kk: u8, rand_byte: u8) -> State {
    let mut v = state.v;
    v[x] = rand_byte & kk;
    State {
        pc: state.next_pc(),
        v,
        ..*state
    }
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory i..n at position x, y on the FrameBuffer with wrapping.
/// Sets VF if any pixels would be erased
pub fn draw(state: &State, x: usize, y: usize, n: u8) -> State {
    let mut v = state.v;
    let mut frame_buffer = state.frame_buffer;

    // Reset the carry flag (used for collision detection)
    v[FLAG_REGISTER] = 0x0;

    let origin_x = state.v[x] as usize;
    let origin_y = state.v[y] as usize;
    for row in 0..n as usize {
        let py = (origin_y + row) % DISPLAY_HEIGHT;
        let sprite_byte = state.read(state.i.wrapping_add(row as u16));
        for bit in 0..8 {
            let px = (origin_x + bit) % DISPLAY_WIDTH;
            let pixel_value = (sprite_byte >> (7 - bit)) & 0x1;
            v[FLAG_REGISTER] |= pixel_value & frame_buffer[py][px];
            frame_buffer[py][px] ^= pixel_value;
        }
    }

    State {
        pc: state.next_pc(),
        draw_flag: true,
        v,
        frame_buffer,
        ..*state
    }
}

/// if Vx.pressed then pc += 2
pub fn skpr(state: &State, x: usize, keypad: &Keypad) -> State {
    skip_if(state, keypad.is_pressed(state.v[x]))
}

/// if !Vx.pressed then pc += 2
pub fn skup(state: &State, x: usize, keypad: &Keypad) -> State {
    skip_if(state, !keypad.is_pressed(state.v[x]))
}

/// Vx = DT
pub fn moved(state: &State, x: usize) -> State {
    let mut v = state.v;
    v[x] = state.delay_timer;
    State {
        pc: state.next_pc(),
        v,
        ..*state
    }
}

/// await keypress for Vx
/// Scans the keypad once; while nothing is pressed the pc stays put so the
/// next cycle runs this instruction again.
pub fn keyd(state: &State, x: usize, keypad: &Keypad) -> State {
    match keypad.first_pressed() {
        Some(key) => {
            let mut v = state.v;
            v[x] = key;
            State {
                pc: state.next_pc(),
                v,
                ..*state
            }
        }
        None => *state,
    }
}

/// DT = Vx
pub fn loads(state: &State, x: usize) -> State {
    State {
        pc: state.next_pc(),
        delay_timer: state.v[x],
        ..*state
    }
}

/// ST = Vx
pub fn ld(state: &State, x: usize) -> State {
    State {
        pc: state.next_pc(),
        sound_timer: state.v[x],
        ..*state
    }
}

/// I += Vx
pub fn addi(state: &State, x: usize) -> State {
    State {
        pc: state.next_pc(),
        i: state.i.wrapping_add(u16::from(state.v[x])),
        ..*state
    }
}

/// I = Vx * 5
/// Set I to the memory address of the sprite for Vx
/// See constants::FONT_SET for more details
pub fn ldspr(state: &State, x: usize) -> Result<State> {
    let index = state.v[x];
    if index > 0xF {
        return Err(Chip8Error::OutOfBoundsFontIndex { index });
    }
    Ok(State {
        pc: state.next_pc(),
        i: FONT_START + u16::from(index) * FONT_GLYPH_SIZE,
        ..*state
    })
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address i
pub fn bcd(state: &State, x: usize) -> State {
    let bcd = [state.v[x] / 100 % 10, state.v[x] / 10 % 10, state.v[x] % 10];
    let mut next = State {
        pc: state.next_pc(),
        ..*state
    };
    for (offset, digit) in (0u16..).zip(bcd) {
        next.write(state.i.wrapping_add(offset), digit);
    }
    next
}

/// mem[I..=I+x] = V0..=Vx
/// Fill memory starting at address i with V0..=Vx; I is left untouched
pub fn stor(state: &State, x: usize) -> State {
    let mut next = State {
        pc: state.next_pc(),
        ..*state
    };
    for (offset, &value) in (0u16..).zip(&state.v[..=x]) {
        next.write(state.i.wrapping_add(offset), value);
    }
    next
}

/// V0..=Vx = mem[I..=I+x]
/// Fill V0..=Vx with memory starting at address i; I is left untouched
pub fn read(state: &State, x: usize) -> State {
    let mut v = state.v;
    for (offset, register) in (0u16..).zip(v[..=x].iter_mut()) {
        *register = state.read(state.i.wrapping_add(offset));
    }
    State {
        pc: state.next_pc(),
        v,
        ..*state
    }
}
