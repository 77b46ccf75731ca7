/// Commands that can be received by an SR-family tag in selected state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// `ReadBlock(block_address)`
    /// From 0 to the last EEPROM block, or 255 for system.
    ReadBlock(u8),
    /// `WriteBlock(block_address, block_word)`
    /// The word goes out in the same byte order `ReadBlock` returns it.
    WriteBlock(u8, u32),
    /// UID of tag.
    GetUid,
}

impl Command {
    /// Number of bytes the tag answers with.
    pub fn response_len(&self) -> usize {
        match self {
            Command::ReadBlock(_) => crate::mem::BLOCK_SIZE,
            Command::WriteBlock(..) => 0,
            Command::GetUid => crate::mem::UID_SIZE,
        }
    }
}

impl From<Command> for Vec<u8> {
    /// Convert command variant to frame that will be sent to the tag.
    fn from(value: Command) -> Self {
        match value {
            Command::ReadBlock(address) => vec![0x08, address],
            Command::WriteBlock(address, word) => {
                let mut frame = vec![0x09, address];
                frame.extend(word.to_be_bytes());
                frame
            }
            Command::GetUid => vec![0x0B],
        }
    }
}
