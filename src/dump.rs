use std::io::Write;

use log::info;

use crate::mem::{Block, TagVariant};
use crate::presenter;
use crate::reader::Reader;
use crate::session::SrTag;
use crate::Result;

/// `[II] BB BB BB BB --- <label>`, with the label dimmed.
pub fn dump_line(block: u8, data: &Block, label: &str) -> String {
    format!(
        "[{:02X}] {:02X} {:02X} {:02X} {:02X} --- {}",
        block,
        data[0],
        data[1],
        data[2],
        data[3],
        presenter::label(label)
    )
}

/// Read every EEPROM block of `variant` in ascending order and print one
/// annotated line per block. Stops at the first failed read, or before the
/// next block once SIGINT arrived.
pub fn dump_eeprom<R: Reader, W: Write>(
    tag: &mut SrTag<'_, R>,
    variant: TagVariant,
    out: &mut W,
) -> Result<Vec<Block>> {
    info!("Reading {} blocks...", variant.block_count());
    let mut eeprom = Vec::with_capacity(variant.block_count());
    for block in variant.blocks() {
        tag.check_interrupt()?;
        let data = tag.read_block(block)?;
        writeln!(out, "{}", dump_line(block, &data, variant.label(block)))?;
        eeprom.push(data);
    }
    Ok(eeprom)
}
