use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::mem::{Block, TagVariant, SYSTEM_ADDR};
use crate::reader::{Modulation, Reader};
use crate::{Error, Result};

/// Everything a [`MockReader`] observed, shared with the test that built it.
#[derive(Debug, Default)]
pub struct MockLog {
    pub initiator: bool,
    pub listed: Vec<Modulation>,
    pub selected: Vec<Modulation>,
    pub reads: Vec<u8>,
    pub writes: Vec<(u8, u32)>,
    pub closes: usize,
}

/// In-memory SR tag behind a reader, for unit and integration tests.
#[derive(Debug)]
pub struct MockReader {
    pub name: String,
    pub blocks: Vec<Block>,
    pub system: Block,
    pub uid: u64,
    /// Blocks whose read returns only the given number of bytes.
    pub short_reads: HashMap<u8, usize>,
    /// Blocks whose write fails.
    pub failing_writes: HashSet<u8>,
    /// Number of ISO14443B2SR listings answered with zero targets; `None`
    /// means the tag never shows up.
    pub polls_until_present: Option<usize>,
    pub fail_initiator: bool,
    pub fail_select: bool,
    log: Rc<RefCell<MockLog>>,
}

impl MockReader {
    /// A present tag of the given variant with every block zeroed.
    pub fn new(variant: TagVariant) -> Self {
        Self::with_blocks(vec![[0; 4]; variant.block_count()])
    }

    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        Self {
            name: "mock reader".to_string(),
            blocks,
            system: [0xFF; 4],
            uid: 0xD002_1234_5678_9ABC,
            short_reads: HashMap::new(),
            failing_writes: HashSet::new(),
            polls_until_present: Some(0),
            fail_initiator: false,
            fail_select: false,
            log: Rc::new(RefCell::new(MockLog::default())),
        }
    }

    /// Store `word` big-endian at `block`.
    pub fn set_word(&mut self, block: u8, word: u32) {
        self.blocks[usize::from(block)] = word.to_be_bytes();
    }

    pub fn word(&self, block: u8) -> u32 {
        u32::from_be_bytes(self.blocks[usize::from(block)])
    }

    /// Make reads of `block` return only `len` bytes.
    pub fn short_read(&mut self, block: u8, len: usize) {
        self.short_reads.insert(block, len);
    }

    pub fn log(&self) -> Rc<RefCell<MockLog>> {
        Rc::clone(&self.log)
    }

    fn block(&self, address: u8) -> Option<Block> {
        if address == SYSTEM_ADDR {
            return Some(self.system);
        }
        self.blocks.get(usize::from(address)).copied()
    }

    fn tag_answers(&mut self) -> bool {
        match self.polls_until_present.as_mut() {
            Some(0) => true,
            Some(remaining) => {
                *remaining -= 1;
                false
            }
            None => false,
        }
    }
}

impl Reader for MockReader {
    fn name(&mut self) -> String {
        self.name.clone()
    }

    fn initiator_init(&mut self) -> Result<()> {
        if self.fail_initiator {
            return Err(Error::Driver(
                "nfc_initiator_init => Input / Output Error".to_string(),
            ));
        }
        self.log.borrow_mut().initiator = true;
        Ok(())
    }

    fn list_passive_targets(&mut self, modulation: Modulation) -> Result<usize> {
        self.log.borrow_mut().listed.push(modulation);
        match modulation {
            Modulation::Iso14443b => Ok(0),
            Modulation::Iso14443b2sr => Ok(usize::from(self.tag_answers())),
        }
    }

    fn select_passive_target(&mut self, modulation: Modulation) -> Result<bool> {
        self.log.borrow_mut().selected.push(modulation);
        Ok(!self.fail_select
            && modulation == Modulation::Iso14443b2sr
            && self.polls_until_present == Some(0))
    }

    fn transceive(&mut self, frame: &[u8], rx_len: usize) -> Result<Vec<u8>> {
        match frame {
            [0x08, address] => {
                self.log.borrow_mut().reads.push(*address);
                let block = self
                    .block(*address)
                    .ok_or_else(|| Error::Driver("RF Transmission Error".to_string()))?;
                let len = self
                    .short_reads
                    .get(address)
                    .copied()
                    .unwrap_or(rx_len)
                    .min(block.len());
                Ok(block[..len].to_vec())
            }
            [0x0B] => Ok(self.uid.to_le_bytes().to_vec()),
            _ => Err(Error::Driver(format!("unexpected frame {:02X?}", frame))),
        }
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<()> {
        match frame {
            [0x09, address, data @ ..] if data.len() == 4 => {
                if self.failing_writes.contains(address) {
                    return Err(Error::Driver("RF Transmission Error".to_string()));
                }
                let word = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
                self.log.borrow_mut().writes.push((*address, word));
                if let Some(slot) = self.blocks.get_mut(usize::from(*address)) {
                    *slot = word.to_be_bytes();
                }
                Ok(())
            }
            _ => Err(Error::Driver(format!("unexpected frame {:02X?}", frame))),
        }
    }

    fn close(self) {
        self.log.borrow_mut().closes += 1;
    }
}
