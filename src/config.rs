//! The `config` file shared by both tools.
//!
//! One `key=value;` record per line. Keys are at most 20 characters and
//! values at most 6.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};

use crate::mem::TagVariant;
use crate::{Error, Result};

/// Default location, relative to the working directory.
pub const CONFIG_PATH: &str = "config";

const MAX_KEY_LEN: usize = 20;
const MAX_VALUE_LEN: usize = 6;

/// Raw records in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    entries: Vec<(String, String)>,
}

impl Settings {
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Value of the first record named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Take up to `max` characters before `delimiter`, then the delimiter itself.
fn field<'a>(rest: &'a str, delimiter: char, max: usize) -> Option<(&'a str, &'a str)> {
    let end = rest
        .char_indices()
        .take(max + 1)
        .find(|&(_, c)| c == delimiter)
        .map(|(i, _)| i)?;
    if end == 0 {
        return None;
    }
    Some((&rest[..end], &rest[end + delimiter.len_utf8()..]))
}

impl FromStr for Settings {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut entries = Vec::new();
        let mut rest = s.trim_start();

        while !rest.is_empty() {
            let line = s[..s.len() - rest.len()].matches('\n').count() + 1;
            let (key, after_key) =
                field(rest, '=', MAX_KEY_LEN).ok_or(Error::ConfigMalformed { line })?;
            let (value, after_value) = field(after_key, ';', MAX_VALUE_LEN)
                .ok_or(Error::ConfigMalformed { line })?;

            entries.push((key.trim().to_string(), value.trim().to_string()));
            rest = after_value.trim_start();
        }

        Ok(Settings { entries })
    }
}

/// Options recognised by the tools.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub tag_type: TagVariant,
    pub verbose: bool,
    pub skip_confirmation: bool,
}

/// `on` enables a switch; anything else leaves it off.
fn switch(settings: &Settings, key: &str) -> bool {
    match settings.get(key) {
        None | Some("off") => false,
        Some("on") => true,
        Some(value) => {
            warn!("Unsupported value \"{}\" for {}, using off", value, key);
            false
        }
    }
}

impl Config {
    /// Read and parse the config file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigMissing {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_settings(&text.parse::<Settings>()?);
        debug!("Loaded {:?} from {}", config, path.display());
        Ok(config)
    }

    /// Pick the known keys out of `settings`; anything else is ignored.
    /// Unsupported values fall back to the default.
    pub fn from_settings(settings: &Settings) -> Self {
        let tag_type = match settings.get("tag_type") {
            None => TagVariant::default(),
            Some(value) => value.parse::<TagVariant>().unwrap_or_else(|_| {
                warn!(
                    "Unsupported value \"{}\" for tag_type, using {}",
                    value,
                    TagVariant::default()
                );
                TagVariant::default()
            }),
        };

        Config {
            tag_type,
            verbose: switch(settings, "verbose"),
            skip_confirmation: switch(settings, "skip_confirmation"),
        }
    }
}
