use chip8_vm::Chip8;
use proptest::prelude::*;

/// Loads V[x] = a and V[y] = b, then runs `op`
fn run_alu(x: u8, y: u8, a: u8, b: u8, op: u8) -> Chip8 {
    let rom = [0x60 | x, a, 0x60 | y, b, 0x80 | x, y << 4 | op];
    let mut chip8 = Chip8::with_seed(0);
    chip8.load_bytes(&rom).unwrap();
    for _ in 0..3 {
        chip8.step_instruction().unwrap();
    }
    chip8
}

proptest! {
    #[test]
    fn ld_sets_register_and_advances(x in 0u8..16, kk in any::<u8>()) {
        let mut chip8 = Chip8::with_seed(0);
        chip8.load_bytes(&[0x60 | x, kk]).unwrap();
        chip8.step_instruction().unwrap();
        prop_assert_eq!(chip8.state().v[x as usize], kk);
        prop_assert_eq!(chip8.state().pc, 0x202);
    }

    #[test]
    fn add_reg_carries(x in 0u8..15, y in 0u8..15, a in any::<u8>(), b in any::<u8>()) {
        prop_assume!(x != y);
        let chip8 = run_alu(x, y, a, b, 0x4);
        prop_assert_eq!(chip8.state().v[x as usize], a.wrapping_add(b));
        prop_assert_eq!(chip8.state().v[0xF], u8::from(a as u16 + b as u16 > 255));
    }

    #[test]
    fn sub_sets_not_borrow(x in 0u8..15, y in 0u8..15, a in any::<u8>(), b in any::<u8>()) {
        prop_assume!(x != y);
        let chip8 = run_alu(x, y, a, b, 0x5);
        prop_assert_eq!(chip8.state().v[x as usize], a.wrapping_sub(b));
        prop_assert_eq!(chip8.state().v[0xF], u8::from(a >= b));
    }

    #[test]
    fn subn_sets_not_borrow(x in 0u8..15, y in 0u8..15, a in any::<u8>(), b in any::<u8>()) {
        prop_assume!(x != y);
        let chip8 = run_alu(x, y, a, b, 0x7);
        prop_assert_eq!(chip8.state().v[x as usize], b.wrapping_sub(a));
        prop_assert_eq!(chip8.state().v[0xF], u8::from(b >= a));
    }

    #[test]
    fn shifts_flag_the_bit_shifted_out(x in 0u8..15, a in any::<u8>()) {
        let y = (x + 1) % 15;
        let right = run_alu(x, y, a, 0, 0x6);
        prop_assert_eq!(right.state().v[x as usize], a >> 1);
        prop_assert_eq!(right.state().v[0xF], a & 0x1);

        let left = run_alu(x, y, a, 0, 0xE);
        prop_assert_eq!(left.state().v[x as usize], a << 1);
        prop_assert_eq!(left.state().v[0xF], a >> 7);
    }

    #[test]
    fn logic_ops_leave_vf_alone(x in 0u8..15, y in 0u8..15, a in any::<u8>(), b in any::<u8>(), op in 0u8..4) {
        prop_assume!(x != y);
        let rom = [0x6F, 0x42, 0x60 | x, a, 0x60 | y, b, 0x80 | x, y << 4 | op];
        let mut chip8 = Chip8::with_seed(0);
        chip8.load_bytes(&rom).unwrap();
        for _ in 0..4 {
            chip8.step_instruction().unwrap();
        }
        prop_assert_eq!(chip8.state().v[0xF], 0x42);
    }

    #[test]
    fn timers_never_go_negative(start in any::<u8>(), ticks in 0usize..600) {
        let mut chip8 = Chip8::with_seed(0);
        chip8.load_bytes(&[0x60, start, 0xF0, 0x15, 0xF0, 0x18]).unwrap();
        for _ in 0..3 {
            chip8.step_instruction().unwrap();
        }
        for _ in 0..ticks {
            chip8.tick_timers();
        }
        let expected = (start as usize).saturating_sub(ticks) as u8;
        prop_assert_eq!(chip8.delay_timer(), expected);
        prop_assert_eq!(chip8.sound_timer(), expected);
    }
}
