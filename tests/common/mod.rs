// Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::io::{self, BufRead, BufReader, Read};

use srix_tools::dump::dump_eeprom;
use srix_tools::mem::{Block, TagVariant};
use srix_tools::otp::{reset_otp, Outcome, ResetOptions};
use srix_tools::reader::MockReader;
use srix_tools::{Interrupt, ReaderHandle, Result, SrTag};

/// Counter word of a tag that never had its OTP area reset.
pub const FRESH_COUNTER: u32 = 0xFFE0_0000;

/// An SRIX4K with the given OTP blocks and reset counter.
pub fn srix4k(otp: [u32; 5], counter: u32) -> MockReader {
    let mut reader = MockReader::new(TagVariant::Srix4k);
    for (block, word) in otp.iter().enumerate() {
        reader.set_word(block as u8, *word);
    }
    reader.set_word(0x05, 0xFFFF_FFFF);
    reader.set_word(0x06, counter);
    reader
}

/// A tag whose block `n` holds `n, n+1, n+2, n+3`.
pub fn ascending(variant: TagVariant) -> MockReader {
    let blocks: Vec<Block> = variant
        .blocks()
        .map(|b| {
            let n = b.wrapping_mul(4);
            [n, n.wrapping_add(1), n.wrapping_add(2), n.wrapping_add(3)]
        })
        .collect();
    MockReader::with_blocks(blocks)
}

/// Select the mock tag and run the OTP reset, answering the prompt with
/// `answer`. The reader is released before returning.
pub fn run_reset(
    reader: MockReader,
    options: ResetOptions,
    answer: &str,
) -> (Result<Outcome>, String) {
    let interrupt = Interrupt::default();
    run_reset_with(reader, options, &interrupt, &mut answer.as_bytes())
}

/// Like [`run_reset`], with the caller's interrupt token and prompt input.
pub fn run_reset_with<I: BufRead>(
    reader: MockReader,
    options: ResetOptions,
    interrupt: &Interrupt,
    input: &mut I,
) -> (Result<Outcome>, String) {
    let mut handle = ReaderHandle::new(reader);
    let mut out = Vec::new();

    let result = SrTag::connect(&mut handle, interrupt, &mut out)
        .and_then(|mut tag| reset_otp(&mut tag, options, input, &mut out));
    drop(handle);

    (result, String::from_utf8(out).unwrap())
}

/// Prompt input that raises `interrupt` when the answer is read, as a
/// Ctrl-C typed at the prompt would.
pub struct InterruptedAnswer<'a> {
    interrupt: Interrupt,
    answer: &'a [u8],
}

impl<'a> InterruptedAnswer<'a> {
    pub fn new(interrupt: &Interrupt, answer: &'a str) -> BufReader<Self> {
        BufReader::new(Self {
            interrupt: interrupt.clone(),
            answer: answer.as_bytes(),
        })
    }
}

impl Read for InterruptedAnswer<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt.raise();
        self.answer.read(buf)
    }
}

/// Select the mock tag and dump `variant`. The reader is released before
/// returning.
pub fn run_dump(reader: MockReader, variant: TagVariant) -> (Result<Vec<Block>>, String) {
    let interrupt = Interrupt::default();
    let mut handle = ReaderHandle::new(reader);
    let mut out = Vec::new();

    let result = SrTag::connect(&mut handle, &interrupt, &mut out)
        .and_then(|mut tag| dump_eeprom(&mut tag, variant, &mut out));
    drop(handle);

    (result, String::from_utf8(out).unwrap())
}

fn is_upper_hex(pair: &[u8]) -> bool {
    pair.iter()
        .all(|c| c.is_ascii_digit() || (b'A'..=b'F').contains(c))
}

/// Whether `line` reads `[II] BB BB BB BB --- <label>`.
pub fn is_dump_line(line: &str) -> bool {
    let b = line.as_bytes();
    b.len() > 21
        && b[0] == b'['
        && is_upper_hex(&b[1..3])
        && &b[3..5] == b"] "
        && [5, 8, 11, 14].iter().all(|&i| is_upper_hex(&b[i..i + 2]))
        && b[7] == b' '
        && b[10] == b' '
        && b[13] == b' '
        && &b[16..21] == b" --- "
}
