/// # Opcodes
///
/// Chip-8 opcodes are 16 bits each. Their behavior is cased on some combination of:
/// - `(n, _, _, _)` broad categorization; applies to all opcodes
/// - `(_, _, _, n)` specific behavior within a category
/// - `(_, _, n, n)` more specific behavior within a category
/// - `(_, n, n, n)` some fixed function that doesn't require variables (e.g. CLS; clear screen)
///
/// Nibbles not used to determine the operation often (but not always) carry important data.
/// - `(_, n, n, n)` represent a 12-bit address
/// - `(_, _, n, n)` encodes some data that is assigned to and/or compared with Vx
/// - `(_, n, _, _)` refers either to the register Vx or a range of registers V0..Vx
/// - `(_, _, n, _)` refers to the register Vy
pub trait Opcode {
    /// Returns the Opcode's component nibbles.
    fn nibbles(&self) -> (u8, u8, u8, u8);

    /// The Opcode's second nibble.
    /// `[_x__]`
    fn x(&self) -> usize;

    /// The Opcode's third nibble.
    /// `[__y_]`
    fn y(&self) -> usize;

    /// The Opcode's fourth nibble.
    /// `[___n]`
    fn n(&self) -> u8;

    /// The Opcode's least significant byte.
    /// `[__kk]`
    fn kk(&self) -> u8;

    /// The Opcode without its most significant nibble.
    /// `[_adr]`
    fn addr(&self) -> u16;
}

impl Opcode for u16 {
    fn nibbles(&self) -> (u8, u8, u8, u8) {
        (
            ((self & 0xF000) >> 12) as u8,
            self.x() as u8,
            self.y() as u8,
            self.n(),
        )
    }

    fn x(&self) -> usize {
        ((self & 0x0F00) >> 8) as usize
    }

    fn y(&self) -> usize {
        ((self & 0x00F0) >> 4) as usize
    }

    fn n(&self) -> u8 {
        (self & 0x000F) as u8
    }

    fn kk(&self) -> u8 {
        (self & 0x00FF) as u8
    }

    fn addr(&self) -> u16 {
        self & 0x0FFF
    }
}

#[cfg(test)]
mod test_opcode {
    use super::*;

    #[test]
    fn test_fields_of_a_draw() {
        // DRW V3, VA, 7
        let op: u16 = 0xD3A7;
        assert_eq!(op.nibbles(), (0xD, 0x3, 0xA, 0x7));
        assert_eq!((op.x(), op.y(), op.n()), (0x3, 0xA, 0x7));
    }

    #[test]
    fn test_kk_and_addr_overlap() {
        // LD V6, 0x5C shares its low byte with the address field
        let op: u16 = 0x665C;
        assert_eq!(op.kk(), 0x5C);
        assert_eq!(op.addr(), 0x65C);
    }

    #[test]
    fn test_all_zero_word() {
        let op: u16 = 0x0000;
        assert_eq!(op.nibbles(), (0x0, 0x0, 0x0, 0x0));
        assert_eq!(op.kk(), 0x00);
        assert_eq!(op.addr(), 0x000);
    }

    #[test]
    fn test_all_ones_word_stays_in_range() {
        let op: u16 = 0xFFFF;
        assert_eq!(op.nibbles(), (0xF, 0xF, 0xF, 0xF));
        assert_eq!(op.x(), 15);
        assert_eq!(op.y(), 15);
        assert_eq!(op.kk(), 0xFF);
        assert_eq!(op.addr(), 0xFFF);
    }
}
