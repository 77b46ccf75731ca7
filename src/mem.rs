//! SR-family memory mapping.
//!
//! Both SRI512 and SRIX4K share the same layout for the first sixteen
//! blocks; they only differ in how many generic EEPROM blocks follow.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Size of a single block in bytes.
pub const BLOCK_SIZE: usize = 4;
/// Size of the UID in bytes.
pub const UID_SIZE: usize = 8;

/// A single 4-byte block, in the order the tag sends it.
pub type Block = [u8; BLOCK_SIZE];

/// *Resettable OTP bits* region.
pub const OTP: Range<u8> = 0x00..0x05;
/// Counter block following the OTP bits.
pub const COUNTDOWN_ADDR: u8 = 0x05;
/// Block whose upper 11 bits count the remaining OTP resets.
pub const RESET_COUNTER_ADDR: u8 = 0x06;
/// *Lockable EEPROM* region.
pub const LOCKABLE: Range<u8> = 0x07..0x10;
/// *System OTP bits* block.
pub const SYSTEM_ADDR: u8 = 0xFF;

/// Interpret a block as a big-endian word.
pub fn block_word(block: &Block) -> u32 {
    u32::from_be_bytes(*block)
}

/// SR-family tag models understood by the tools.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TagVariant {
    Sri512,
    #[default]
    Srix4k,
}

impl TagVariant {
    /// Number of addressable EEPROM blocks.
    pub fn block_count(self) -> usize {
        match self {
            TagVariant::Sri512 => 20,
            TagVariant::Srix4k => 128,
        }
    }

    /// EEPROM size in bytes.
    pub fn eeprom_size(self) -> usize {
        self.block_count() * BLOCK_SIZE
    }

    /// Every EEPROM block address, ascending.
    pub fn blocks(self) -> impl Iterator<Item = u8> {
        (0..self.block_count()).map(|block| block as u8)
    }

    /// Whether `block` can be addressed on this variant.
    pub fn contains(self, block: u8) -> bool {
        block == SYSTEM_ADDR || usize::from(block) < self.block_count()
    }

    /// Human readable type of the given block.
    pub fn label(self, block: u8) -> &'static str {
        if !self.contains(block) {
            return "EEPROM";
        }
        match block {
            b if OTP.contains(&b) => "Resettable OTP bits",
            COUNTDOWN_ADDR => "Count down counter",
            RESET_COUNTER_ADDR => "OTP reset counter",
            b if LOCKABLE.contains(&b) => "Lockable EEPROM",
            SYSTEM_ADDR => "System OTP bits",
            _ => "EEPROM",
        }
    }
}

impl fmt::Display for TagVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagVariant::Sri512 => f.write_str("SRI512"),
            TagVariant::Srix4k => f.write_str("SRIX4K"),
        }
    }
}

/// Parses the `tag_type` config values.
impl FromStr for TagVariant {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "512" => Ok(TagVariant::Sri512),
            "4k" => Ok(TagVariant::Srix4k),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_counts() {
        assert_eq!(TagVariant::Sri512.block_count(), 20);
        assert_eq!(TagVariant::Srix4k.block_count(), 128);
        assert_eq!(TagVariant::Sri512.eeprom_size(), 80);
        assert_eq!(TagVariant::Srix4k.eeprom_size(), 512);
        assert_eq!(TagVariant::default(), TagVariant::Srix4k);
    }

    #[test]
    fn blocks_are_ascending() {
        let blocks: Vec<u8> = TagVariant::Sri512.blocks().collect();
        assert_eq!(blocks, (0u8..20).collect::<Vec<_>>());
        assert_eq!(TagVariant::Srix4k.blocks().last(), Some(127));
    }

    #[test]
    fn labels_distinguish_special_blocks() {
        let tag = TagVariant::Srix4k;
        for block in 0..5 {
            assert_eq!(tag.label(block), "Resettable OTP bits");
        }
        assert_eq!(tag.label(0x05), "Count down counter");
        assert_eq!(tag.label(0x06), "OTP reset counter");
        assert_eq!(tag.label(0x07), "Lockable EEPROM");
        assert_eq!(tag.label(0x0F), "Lockable EEPROM");
        assert_eq!(tag.label(0x10), "EEPROM");
        assert_eq!(tag.label(0x7F), "EEPROM");
        assert_eq!(tag.label(0xFF), "System OTP bits");
    }

    #[test]
    fn out_of_range_blocks_are_generic() {
        assert_eq!(TagVariant::Sri512.label(0x40), "EEPROM");
        assert!(!TagVariant::Sri512.contains(20));
        assert!(TagVariant::Sri512.contains(SYSTEM_ADDR));
    }

    #[test]
    fn words_are_big_endian() {
        assert_eq!(block_word(&[0xFF, 0xE0, 0x00, 0x00]), 0xFFE0_0000);
    }

    #[test]
    fn parse_tag_type() {
        assert_eq!("512".parse::<TagVariant>(), Ok(TagVariant::Sri512));
        assert_eq!("4k".parse::<TagVariant>(), Ok(TagVariant::Srix4k));
        assert_eq!("2k".parse::<TagVariant>(), Err(()));
    }
}
