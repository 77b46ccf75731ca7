//! Tools for SR-family (SRI512, SRIX4K) NFC tags behind a libnfc reader:
//! dump the EEPROM and reset the resettable OTP area of an SRIX4K.

extern crate log;
extern crate nfc1;

pub mod command;
pub mod config;
pub mod dump;
pub mod error;
pub mod mem;
pub mod otp;
pub mod presenter;
pub mod reader;
pub mod session;
pub mod signal;

pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::mem::TagVariant;
pub use crate::reader::{Reader, ReaderHandle};
pub use crate::session::SrTag;
pub use crate::signal::Interrupt;
