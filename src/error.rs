use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while talking to a reader or an SR-family tag.
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot open config file \"{}\"", .path.display())]
    ConfigMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file format incorrect at line {line}")]
    ConfigMalformed { line: usize },

    #[error("unable to init libnfc")]
    NoDriver,

    #[error("no readers available")]
    NoReader,

    #[error("unable to open NFC device {0}")]
    DeviceUnavailable(String),

    #[error("{0}")]
    Driver(String),

    #[error("no ISO14443B2SR tag selected")]
    NoTag,

    #[error("error while reading block {block}: received {got} bytes instead of 4")]
    ReadBlock { block: u8, got: usize },

    #[error("error while writing block {block}")]
    WriteBlock { block: u8 },

    #[error("OTP reset counter exhausted (counter word {counter:#010X})")]
    CounterExhausted { counter: u32 },

    #[error("interrupted")]
    Interrupted,

    #[error("reader already closed")]
    ReaderClosed,

    #[error("console error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to install interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_block_display_names_block_and_length() {
        let err = Error::ReadBlock { block: 3, got: 2 };
        let s = err.to_string();
        assert!(s.contains("block 3"));
        assert!(s.contains("received 2 bytes"));
    }

    #[test]
    fn counter_exhausted_display() {
        let err = Error::CounterExhausted {
            counter: 0x001F_FFFF,
        };
        assert!(err.to_string().contains("0x001FFFFF"));
    }

    #[test]
    fn config_missing_display_quotes_path() {
        let err = Error::ConfigMissing {
            path: PathBuf::from("config"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.to_string(), "cannot open config file \"config\"");
    }
}
