//! Reader abstraction: the raw operations an SR session needs from an NFC
//! reader, and a scoped handle that releases the reader exactly once.

pub mod mock;
pub mod nfc;

use log::debug;

use crate::{Error, Result};

pub use mock::{MockLog, MockReader};
pub use nfc::NfcReader;

/// Passive target families used while selecting an SR tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modulation {
    /// Plain ISO14443B, only listed to prime the reader registers.
    Iso14443b,
    /// ISO14443B2SR, the SR-family extension.
    Iso14443b2sr,
}

/// Operations the SR session drives on a reader in initiator mode.
pub trait Reader {
    /// Device name as reported by the driver.
    fn name(&mut self) -> String;

    /// Place the reader in initiator mode.
    fn initiator_init(&mut self) -> Result<()>;

    /// List passive targets of the given family and return how many were found.
    fn list_passive_targets(&mut self, modulation: Modulation) -> Result<usize>;

    /// Select a single passive target. `false` means nothing answered.
    fn select_passive_target(&mut self, modulation: Modulation) -> Result<bool>;

    /// Send a frame and return up to `rx_len` response bytes.
    fn transceive(&mut self, frame: &[u8], rx_len: usize) -> Result<Vec<u8>>;

    /// Send a frame the tag does not answer.
    fn transmit(&mut self, frame: &[u8]) -> Result<()>;

    /// Release the device.
    fn close(self)
    where
        Self: Sized;
}

/// Exclusive owner of an opened reader.
///
/// The reader is closed by [`ReaderHandle::close`] or, failing that, when the
/// handle is dropped; either way the underlying `close` runs once.
pub struct ReaderHandle<R: Reader> {
    reader: Option<R>,
}

impl<R: Reader> ReaderHandle<R> {
    pub fn new(reader: R) -> Self {
        ReaderHandle {
            reader: Some(reader),
        }
    }

    /// Borrow the open reader.
    pub fn reader_mut(&mut self) -> Result<&mut R> {
        self.reader.as_mut().ok_or(Error::ReaderClosed)
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    /// Place the reader in initiator mode.
    pub fn set_initiator(&mut self) -> Result<()> {
        let reader = self.reader_mut()?;
        reader.initiator_init()?;
        debug!("Reader {} in initiator mode", reader.name());
        Ok(())
    }

    /// Release the reader. Calling it again does nothing.
    pub fn close(&mut self) {
        if let Some(mut reader) = self.reader.take() {
            debug!("Closing reader {}", reader.name());
            reader.close();
        }
    }
}

impl<R: Reader> Drop for ReaderHandle<R> {
    fn drop(&mut self) {
        self.close();
    }
}
