use std::io::Write;

use log::{debug, info, trace, warn};
use nfc1::Timeout;

use crate::presenter;
use crate::reader::{Modulation, Reader, ReaderHandle};
use crate::session::SrTag;
use crate::signal::Interrupt;
use crate::{Error, Result};

/// Maximum number of readers listed during enumeration.
pub const MAX_DEVICE_COUNT: usize = 16;
/// Maximum number of targets listed per passive listing.
pub const MAX_TARGET_COUNT: usize = 16;

impl From<Modulation> for nfc1::Modulation {
    fn from(value: Modulation) -> Self {
        let modulation_type = match value {
            Modulation::Iso14443b => nfc1::ModulationType::Iso14443b,
            Modulation::Iso14443b2sr => nfc1::ModulationType::Iso14443b2sr,
        };
        nfc1::Modulation {
            modulation_type,
            baud_rate: nfc1::BaudRate::Baud106,
        }
    }
}

fn driver_error(call: &str, err: nfc1::Error) -> Error {
    Error::Driver(format!("{} => {:?}", call, err))
}

/// A libnfc device.
pub struct NfcReader<'a> {
    device: nfc1::Device<'a>,
}

impl<'a> NfcReader<'a> {
    pub fn new(device: nfc1::Device<'a>) -> Self {
        NfcReader { device }
    }
}

impl Reader for NfcReader<'_> {
    fn name(&mut self) -> String {
        self.device.name().to_string()
    }

    fn initiator_init(&mut self) -> Result<()> {
        self.device
            .initiator_init()
            .map_err(|err| driver_error("nfc_initiator_init", err))?;
        // Selection is polled by the session so it can be interrupted.
        self.device
            .set_property_bool(nfc1::Property::InfiniteSelect, false)
            .map_err(|err| driver_error("nfc_device_set_property_bool", err))
    }

    fn list_passive_targets(&mut self, modulation: Modulation) -> Result<usize> {
        let targets = self
            .device
            .initiator_list_passive_targets(&modulation.into(), MAX_TARGET_COUNT)
            .map_err(|err| driver_error("nfc_initiator_list_passive_targets", err))?;
        Ok(targets.len())
    }

    fn select_passive_target(&mut self, modulation: Modulation) -> Result<bool> {
        match self.device.initiator_select_passive_target(&modulation.into()) {
            Ok(_) => Ok(true),
            Err(err) => {
                warn!("nfc_initiator_select_passive_target => {:?}", err);
                Ok(false)
            }
        }
    }

    fn transceive(&mut self, frame: &[u8], rx_len: usize) -> Result<Vec<u8>> {
        trace!("TX {:02X?}", frame);
        let response = self
            .device
            .initiator_transceive_bytes(frame, rx_len, Timeout::None)
            .map_err(|err| driver_error("nfc_initiator_transceive_bytes", err))?;
        trace!("RX {:02X?}", response);
        Ok(response)
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<()> {
        trace!("TX {:02X?}", frame);
        match self.device.initiator_transceive_bytes(frame, 0, Timeout::None) {
            // SR tags never answer a write.
            Ok(_) | Err(nfc1::Error::RfTransmissionError) => Ok(()),
            Err(err) => Err(driver_error("nfc_initiator_transceive_bytes", err)),
        }
    }

    fn close(mut self) {
        debug!("nfc_close {}", self.device.name());
    }
}

/// List the connection strings of every reader libnfc can see.
pub fn enumerate(context: &mut nfc1::Context) -> Result<Vec<String>> {
    info!("libnfc version: {}", nfc1::version());
    let connstrings = context
        .list_devices(MAX_DEVICE_COUNT)
        .map_err(|err| driver_error("nfc_list_devices", err))?;
    info!("Searching for readers... found {}.", connstrings.len());
    for line in presenter::reader_tree(&connstrings) {
        info!("{}", line);
    }
    Ok(connstrings)
}

/// Pick the reader to open: the requested one, or else the first listed.
pub fn choose_connstring(connstrings: &[String], requested: Option<&str>) -> Result<String> {
    match requested {
        Some(connstring) => Ok(connstring.to_string()),
        None => connstrings.first().cloned().ok_or(Error::NoReader),
    }
}

/// Open a reader, select an SR tag and run `f` on it.
///
/// The reader and the libnfc context are released before returning, whatever
/// `f` returns.
pub fn with_tag<T, W, F>(
    requested: Option<&str>,
    interrupt: &Interrupt,
    out: &mut W,
    f: F,
) -> Result<T>
where
    W: Write,
    F: for<'t, 'r> FnOnce(&mut SrTag<'t, NfcReader<'r>>, &mut W) -> Result<T>,
{
    let mut context = nfc1::Context::new().map_err(|err| {
        debug!("nfc_init => {:?}", err);
        Error::NoDriver
    })?;

    let connstrings = enumerate(&mut context)?;
    let connstring = choose_connstring(&connstrings, requested)?;
    info!("Opening {}...", connstring);
    let device = context.open_with_connstring(&connstring).map_err(|err| {
        debug!("nfc_open => {:?}", err);
        Error::DeviceUnavailable(connstring.clone())
    })?;

    let mut handle = ReaderHandle::new(NfcReader::new(device));
    let result = SrTag::connect(&mut handle, interrupt, out).and_then(|mut tag| f(&mut tag, out));
    handle.close();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_reader_is_default() {
        let readers = vec![
            "pn532_uart:/dev/ttyUSB0".to_string(),
            "acr122_usb:001:004".to_string(),
        ];
        assert_eq!(
            choose_connstring(&readers, None).unwrap(),
            "pn532_uart:/dev/ttyUSB0"
        );
    }

    #[test]
    fn requested_reader_wins() {
        let readers = vec!["pn532_uart:/dev/ttyUSB0".to_string()];
        assert_eq!(
            choose_connstring(&readers, Some("acr122_usb:001:004")).unwrap(),
            "acr122_usb:001:004"
        );
    }

    #[test]
    fn no_reader() {
        assert!(matches!(choose_connstring(&[], None), Err(Error::NoReader)));
    }

    #[test]
    fn sr_modulation_mapping() {
        let modulation: nfc1::Modulation = Modulation::Iso14443b2sr.into();
        assert!(matches!(
            modulation.modulation_type,
            nfc1::ModulationType::Iso14443b2sr
        ));
        assert!(matches!(modulation.baud_rate, nfc1::BaudRate::Baud106));
    }
}
