//! Reset of the SRIX4K resettable OTP area.
//!
//! Blocks 0x00..=0x04 hold OTP bits that can only go from 1 to 0. Writing
//! the reset counter in block 0x06 makes the tag run an auto-erase cycle on
//! those blocks, after which they can be written back to all ones. Each
//! reset costs one unit of the 11-bit counter kept in the upper bits of
//! block 0x06.

use std::io::{BufRead, Write};

use log::{debug, info};

use crate::mem::{OTP, RESET_COUNTER_ADDR};
use crate::presenter;
use crate::reader::Reader;
use crate::session::SrTag;
use crate::{Error, Result};

/// Value of an erased block.
pub const RESET_WORD: u32 = 0xFFFF_FFFF;
/// Position of the remaining-resets counter inside block 0x06.
pub const COUNTER_SHIFT: u32 = 21;
/// One reset, as a block 0x06 word.
pub const COUNTER_UNIT: u32 = 1 << COUNTER_SHIFT;

/// Blocks read before a reset, in order. Block 0x05 is not part of it.
pub const WINDOW: [u8; 6] = [0x00, 0x01, 0x02, 0x03, 0x04, RESET_COUNTER_ADDR];

pub const CONFIRM_PROMPT: &str = ">>> This action is irreversible. Are you sure? [Y/N]:";

/// Current content of the OTP blocks and the reset counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OtpWindow {
    pub otp: [u32; 5],
    pub counter: u32,
}

impl OtpWindow {
    /// Read the window, printing `[II] WWWWWWWW` for every block.
    pub fn read<R: Reader, W: Write>(
        tag: &mut SrTag<'_, R>,
        out: &mut W,
    ) -> Result<Self> {
        writeln!(out, "Reading OTP blocks...")?;
        let mut words = [0u32; WINDOW.len()];
        for (word, &block) in words.iter_mut().zip(WINDOW.iter()) {
            tag.check_interrupt()?;
            *word = tag.read_word(block)?;
            writeln!(out, "[{:02X}] {:08X}", block, *word)?;
        }
        Ok(OtpWindow {
            otp: [words[0], words[1], words[2], words[3], words[4]],
            counter: words[5],
        })
    }

    /// Whether every OTP block is already erased.
    pub fn is_reset(&self) -> bool {
        self.otp.iter().all(|&word| word == RESET_WORD)
    }

    pub fn resets_available(&self) -> u32 {
        self.counter >> COUNTER_SHIFT
    }

    /// Block 0x06 word after one more reset. An exhausted counter is refused
    /// unless `allow_wrap` is set.
    pub fn next_counter(&self, allow_wrap: bool) -> Result<u32> {
        match self.counter.checked_sub(COUNTER_UNIT) {
            Some(next) => Ok(next),
            None if allow_wrap => Ok(self.counter.wrapping_sub(COUNTER_UNIT)),
            None => Err(Error::CounterExhausted {
                counter: self.counter,
            }),
        }
    }

    /// Writes performing the reset, in the order they must reach the tag:
    /// the counter first, then every OTP block.
    pub fn plan(&self, next_counter: u32) -> Vec<(u8, u32)> {
        let mut writes = vec![(RESET_COUNTER_ADDR, next_counter)];
        writes.extend(OTP.map(|block| (block, RESET_WORD)));
        writes
    }

    /// `[II] OLD -> NEW` for every block the reset touches.
    pub fn preview(&self, next_counter: u32) -> Vec<String> {
        let mut lines: Vec<String> = OTP
            .zip(self.otp.iter())
            .map(|(block, word)| {
                format!("[{:02X}] {:08X} -> {:08X}", block, word, RESET_WORD)
            })
            .collect();
        lines.push(format!(
            "[{:02X}] {:08X} -> {:08X}",
            RESET_COUNTER_ADDR, self.counter, next_counter
        ));
        lines
    }
}

/// How a reset run ended without error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The OTP blocks were already erased; nothing was written.
    AlreadyReset,
    /// The user did not confirm; nothing was written.
    Declined,
    /// The full write sequence was issued.
    Reset,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResetOptions {
    pub skip_confirmation: bool,
    /// Decrement an exhausted counter anyway.
    pub allow_counter_wrap: bool,
}

/// Reset the OTP area of the selected SRIX4K.
///
/// Once the first write went out the sequence is not interrupted; a failed
/// write leaves the tag partially reset.
pub fn reset_otp<R, I, W>(
    tag: &mut SrTag<'_, R>,
    options: ResetOptions,
    input: &mut I,
    out: &mut W,
) -> Result<Outcome>
where
    R: Reader,
    I: BufRead,
    W: Write,
{
    let window = OtpWindow::read(tag, out)?;

    if window.is_reset() {
        writeln!(out, "OTP area already reset.")?;
        return Ok(Outcome::AlreadyReset);
    }

    writeln!(out, "OTP resets available: {}", window.resets_available())?;
    let next_counter = window.next_counter(options.allow_counter_wrap)?;
    writeln!(
        out,
        "OTP resets remaining after this operation: {}",
        next_counter >> COUNTER_SHIFT
    )?;

    for line in window.preview(next_counter) {
        writeln!(out, "{}", line)?;
    }

    if !options.skip_confirmation && !presenter::confirm(CONFIRM_PROMPT, input, out)? {
        writeln!(out, "Exiting...")?;
        return Ok(Outcome::Declined);
    }
    tag.check_interrupt()?;

    debug!(
        "Resetting OTP area, counter {:#010X} -> {:#010X}",
        window.counter, next_counter
    );
    for (block, word) in window.plan(next_counter) {
        tag.write_block(block, word)?;
    }
    info!("OTP area reset.");

    Ok(Outcome::Reset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> OtpWindow {
        OtpWindow {
            otp: [0; 5],
            counter: 0xFFE0_0000,
        }
    }

    #[test]
    fn counter_is_upper_eleven_bits() {
        assert_eq!(fresh().resets_available(), 2047);
        assert_eq!(fresh().next_counter(false).unwrap(), 0xFFC0_0000);
    }

    #[test]
    fn decrement_keeps_low_bits() {
        let window = OtpWindow {
            otp: [0; 5],
            counter: 0x0020_1234,
        };
        assert_eq!(window.next_counter(false).unwrap(), 0x0000_1234);
    }

    #[test]
    fn exhausted_counter_is_refused() {
        let window = OtpWindow {
            otp: [0; 5],
            counter: 0x001F_FFFF,
        };
        assert!(matches!(
            window.next_counter(false),
            Err(Error::CounterExhausted { counter: 0x001F_FFFF })
        ));
        assert_eq!(window.next_counter(true).unwrap(), 0xFFFF_FFFF);
    }

    #[test]
    fn already_reset_needs_all_five_blocks() {
        let mut window = OtpWindow {
            otp: [RESET_WORD; 5],
            counter: 0,
        };
        assert!(window.is_reset());
        window.otp[4] = 0xFFFF_FFFE;
        assert!(!window.is_reset());
    }

    #[test]
    fn plan_writes_counter_first() {
        assert_eq!(
            fresh().plan(0xFFC0_0000),
            vec![
                (0x06, 0xFFC0_0000),
                (0x00, RESET_WORD),
                (0x01, RESET_WORD),
                (0x02, RESET_WORD),
                (0x03, RESET_WORD),
                (0x04, RESET_WORD),
            ]
        );
    }

    #[test]
    fn preview_lines() {
        let lines = fresh().preview(0xFFC0_0000);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "[00] 00000000 -> FFFFFFFF");
        assert_eq!(lines[4], "[04] 00000000 -> FFFFFFFF");
        assert_eq!(lines[5], "[06] FFE00000 -> FFC00000");
    }
}
