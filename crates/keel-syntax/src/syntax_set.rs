use crate::SyntaxKind;

const SIZE: usize = SyntaxKind::COUNT.div_ceil(u64::BITS as usize);

/// A compile-time set of kinds, used for first/follow/recovery sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyntaxSet {
    bits: [u64; SIZE],
}

impl SyntaxSet {
    pub const EMPTY: Self = Self { bits: [0; SIZE] };
    const BITS_PER_SLOT: u16 = u64::BITS as u16;

    const fn from_kind(kind: SyntaxKind) -> Self {
        let kind = kind as u16;
        let slot_index = (kind / Self::BITS_PER_SLOT) as usize;
        let mask = 1 << (kind % Self::BITS_PER_SLOT);

        let mut bits = Self::EMPTY.bits;
        bits[slot_index] = mask;

        Self { bits }
    }

    pub const fn union(mut self, other: &Self) -> Self {
        let mut i = 0;

        while i < self.bits.len() {
            self.bits[i] |= other.bits[i];
            i += 1;
        }

        self
    }

    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut set = Self::EMPTY;

        let mut i = 0;
        while i < kinds.len() {
            set = set.union(&Self::from_kind(kinds[i]));
            i += 1;
        }

        set
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        let slot_index = (kind / Self::BITS_PER_SLOT) as usize;
        let mask = 1 << (kind % Self::BITS_PER_SLOT);

        self.bits[slot_index] & mask != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;

    #[test]
    fn kinds_in_every_slot() {
        const SET: SyntaxSet = SyntaxSet::new([LEFT_PAREN, WHILE_KW, BLOCK, TOMBSTONE]);

        assert!(SET.contains(LEFT_PAREN));
        assert!(SET.contains(WHILE_KW));
        assert!(SET.contains(BLOCK));
        assert!(SET.contains(TOMBSTONE));
        assert!(!SET.contains(RIGHT_PAREN));
        assert!(!SET.contains(ERROR));
    }

    #[test]
    fn union_merges() {
        let left = SyntaxSet::new([CLASS_KW]);
        let right = SyntaxSet::new([STRUCT_KW]);
        let both = left.union(&right);

        assert!(both.contains(CLASS_KW) && both.contains(STRUCT_KW));
        assert!(!left.contains(STRUCT_KW));
    }
}
