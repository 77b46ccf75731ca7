use std::io::Write;
use std::thread;
use std::time::Duration;

use log::{debug, info, trace, warn};

use crate::command::Command;
use crate::mem::{block_word, Block, UID_SIZE};
use crate::reader::{Modulation, Reader, ReaderHandle};
use crate::signal::Interrupt;
use crate::{Error, Result};

/// Delay between two ISO14443B2SR listings while waiting for a tag.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A selected SR-family tag.
///
/// The session mutably borrows the reader handle, so a reader carries at
/// most one session at a time.
pub struct SrTag<'a, R: Reader> {
    /// Reader that is connected to the tag.
    reader: &'a mut R,
    interrupt: &'a Interrupt,
}

impl<'a, R: Reader> SrTag<'a, R> {
    /// Put the reader in initiator mode and select the SR tag in the field,
    /// waiting for one to be presented if necessary.
    pub fn connect<W: Write>(
        handle: &'a mut ReaderHandle<R>,
        interrupt: &'a Interrupt,
        out: &mut W,
    ) -> Result<Self> {
        handle.set_initiator()?;
        let reader = handle.reader_mut()?;
        let name = reader.name();
        info!("NFC reader: {}", name);

        // libnfc needs an ISO14443B listing to set up the reader registers
        // before ISO14443B2SR targets answer.
        match reader.list_passive_targets(Modulation::Iso14443b) {
            Ok(found) => info!("Searching for ISO14443B targets... found {}.", found),
            Err(err) => debug!("ISO14443B listing failed: {}", err),
        }

        let mut found = reader.list_passive_targets(Modulation::Iso14443b2sr)?;
        info!("Searching for ISO14443B2SR targets... found {}.", found);

        if found == 0 {
            writeln!(out, "Waiting for tag...")?;
            out.flush()?;
            while found == 0 {
                if interrupt.is_raised() {
                    return Err(Error::Interrupted);
                }
                thread::sleep(POLL_INTERVAL);
                found = reader.list_passive_targets(Modulation::Iso14443b2sr)?;
            }
        }

        if !reader.select_passive_target(Modulation::Iso14443b2sr)? {
            return Err(Error::NoTag);
        }

        let mut tag = SrTag { reader, interrupt };
        match tag.uid() {
            Ok(uid) => info!("Connected to tag {:016X} from device {}", uid, name),
            Err(err) => warn!("Unable to read tag UID: {}", err),
        }
        Ok(tag)
    }

    /// Send `ReadBlock` command to the tag and return the block data.
    pub fn read_block(&mut self, block: u8) -> Result<Block> {
        trace!("Reading block {:#04X}", block);
        let command = Command::ReadBlock(block);
        let frame: Vec<u8> = command.into();
        let response = match self.reader.transceive(&frame, command.response_len()) {
            Ok(response) => response,
            Err(err) => {
                debug!("{}", err);
                return Err(Error::ReadBlock { block, got: 0 });
            }
        };

        let data: Block = response.as_slice().try_into().map_err(|_| {
            info!("Received {} bytes instead of 4.", response.len());
            Error::ReadBlock {
                block,
                got: response.len(),
            }
        })?;

        trace!("{:#04X}: {:#010X}", block, block_word(&data));
        Ok(data)
    }

    /// Read a block as a big-endian word.
    pub fn read_word(&mut self, block: u8) -> Result<u32> {
        self.read_block(block).map(|data| block_word(&data))
    }

    /// Send `WriteBlock` command to the tag.
    ///
    /// Nothing is read back; the tag runs its own erase cycle when needed.
    pub fn write_block(&mut self, block: u8, word: u32) -> Result<()> {
        trace!("Writing {:#010X} to block {:#04X}", word, block);
        let frame: Vec<u8> = Command::WriteBlock(block, word).into();
        self.reader.transmit(&frame).map_err(|err| {
            warn!("{}", err);
            Error::WriteBlock { block }
        })
    }

    /// Send `GetUID` command to the tag and return UID.
    pub fn uid(&mut self) -> Result<u64> {
        let frame: Vec<u8> = Command::GetUid.into();
        let response = self
            .reader
            .transceive(&frame, Command::GetUid.response_len())?;
        let uid: [u8; UID_SIZE] = response
            .as_slice()
            .try_into()
            .map_err(|_| Error::Driver(format!("UID of {} bytes", response.len())))?;
        Ok(u64::from_le_bytes(uid))
    }

    /// Fail with [`Error::Interrupted`] if SIGINT arrived.
    pub fn check_interrupt(&self) -> Result<()> {
        if self.interrupt.is_raised() {
            Err(Error::Interrupted)
        } else {
            Ok(())
        }
    }
}
