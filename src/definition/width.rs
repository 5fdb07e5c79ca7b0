//! Integer width selection for ordinal encodings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unsigned fixed-width integer ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UintWidth {
    U8,
    U16,
    U32,
    U64,
}

impl UintWidth {
    pub const LADDER: [UintWidth; 4] = [Self::U8, Self::U16, Self::U32, Self::U64];

    /// Smallest width able to index `count` distinct values `0..count`
    pub fn for_count(count: usize) -> Self {
        let max_ordinal = count.saturating_sub(1) as u64;
        Self::LADDER
            .into_iter()
            .find(|width| max_ordinal <= width.max_value())
            .unwrap_or(Self::U64)
    }

    pub fn bits(self) -> u32 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::U32 => 32,
            Self::U64 => 64,
        }
    }

    pub fn max_value(self) -> u64 {
        match self {
            Self::U8 => u8::MAX as u64,
            Self::U16 => u16::MAX as u64,
            Self::U32 => u32::MAX as u64,
            Self::U64 => u64::MAX,
        }
    }
}

impl fmt::Display for UintWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uint{}", self.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_counts() {
        assert_eq!(UintWidth::for_count(0), UintWidth::U8);
        assert_eq!(UintWidth::for_count(1), UintWidth::U8);
        assert_eq!(UintWidth::for_count(2), UintWidth::U8);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(UintWidth::for_count(256), UintWidth::U8);
        assert_eq!(UintWidth::for_count(257), UintWidth::U16);
        assert_eq!(UintWidth::for_count(300), UintWidth::U16);
        assert_eq!(UintWidth::for_count(65_536), UintWidth::U16);
        assert_eq!(UintWidth::for_count(65_537), UintWidth::U32);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_wide_tiers() {
        assert_eq!(UintWidth::for_count(1 << 32), UintWidth::U32);
        assert_eq!(UintWidth::for_count((1 << 32) + 1), UintWidth::U64);
        assert_eq!(UintWidth::for_count(usize::MAX), UintWidth::U64);
    }

    #[test]
    fn test_display() {
        assert_eq!(UintWidth::U8.to_string(), "uint8");
        assert_eq!(UintWidth::U64.to_string(), "uint64");
    }
}
