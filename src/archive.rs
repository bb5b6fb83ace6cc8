//! Result archives: the ZIP bundle returned by the processing service.
//!
//! Entries are read into memory once; payloads are then fetched by name as
//! text or bytes. Entry names are tagged with a [`PayloadKind`] here so the
//! engine never has to look at file names.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::payload::PayloadKind;

/// Suffix of junction payloads accompanying a result payload.
const CONNECTION_SUFFIX: &str = "_raw_connection.json";

/// What an archive entry contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Annotation payload
    Payload(PayloadKind),
    /// Junction overlay for another payload
    Connection,
    /// Base image
    Image,
    Other,
}

impl EntryKind {
    /// Tag an entry by name.
    pub fn of(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(CONNECTION_SUFFIX) {
            EntryKind::Connection
        } else if lower.ends_with(".json") {
            EntryKind::Payload(PayloadKind::from_entry_name(name))
        } else if [".png", ".jpg", ".jpeg"].iter().any(|ext| lower.ends_with(ext)) {
            EntryKind::Image
        } else {
            EntryKind::Other
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Payload(kind) => write!(f, "payload:{}", kind),
            EntryKind::Connection => f.write_str("connection"),
            EntryKind::Image => f.write_str("image"),
            EntryKind::Other => f.write_str("other"),
        }
    }
}

/// Skip macOS metadata and hidden files.
fn is_listed_entry(name: &str) -> bool {
    let lower = name.to_lowercase();
    !(lower.contains("__macosx") || lower.contains("/.") || lower.starts_with('.'))
}

/// An archive held in memory, keyed by entry name.
#[derive(Debug, Clone, Default)]
pub struct ResultArchive {
    name: String,
    entries: BTreeMap<String, Vec<u8>>,
}

impl ResultArchive {
    /// Read an archive from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.zip");

        log::info!("Opening ZIP file: {:?}", path);
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, name)
    }

    /// Read an archive already loaded as bytes.
    pub fn from_bytes(data: &[u8], name: &str) -> Result<Self> {
        Self::from_reader(std::io::Cursor::new(data), name)
    }

    fn from_reader<R: Read + Seek>(reader: R, name: &str) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        log::debug!("ZIP '{}' contains {} entries", name, archive.len());

        let mut entries = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let entry_name = file.name().to_string();

            if file.is_dir() {
                log::trace!("Skipping directory: {}", entry_name);
                continue;
            }
            if !is_listed_entry(&entry_name) {
                log::trace!("Skipping hidden entry: {}", entry_name);
                continue;
            }

            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            log::trace!("Read '{}' ({} bytes)", entry_name, data.len());
            entries.insert(entry_name, data);
        }

        log::info!("Loaded {} entries from ZIP '{}'", entries.len(), name);
        Ok(Self {
            name: name.to_string(),
            entries,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All entry names, sorted.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn read_bytes(&self, name: &str) -> Result<&[u8]> {
        self.entries
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::EntryNotFound {
                name: name.to_string(),
            })
    }

    /// Entry content as UTF-8 text.
    pub fn read_text(&self, name: &str) -> Result<String> {
        let bytes = self.read_bytes(name)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
    }

    /// Payload entries with their kinds, in name order.
    pub fn payloads(&self) -> Vec<(&str, PayloadKind)> {
        self.entry_names()
            .filter_map(|name| match EntryKind::of(name) {
                EntryKind::Payload(kind) => Some((name, kind)),
                _ => None,
            })
            .collect()
    }

    /// First crop payload, which carries the crop transform.
    pub fn find_crop_payload(&self) -> Option<&str> {
        self.payloads()
            .into_iter()
            .find(|(_, kind)| *kind == PayloadKind::Crop)
            .map(|(name, _)| name)
    }

    /// First image entry.
    pub fn find_image(&self) -> Option<&str> {
        self.entry_names()
            .find(|name| EntryKind::of(name) == EntryKind::Image)
    }

    /// Junction payload belonging to `payload`, if the archive has one.
    pub fn connection_for(&self, payload: &str) -> Option<&str> {
        let stem = payload.strip_suffix(".json")?;
        let name = format!("{}{}", stem, CONNECTION_SUFFIX);
        self.entries.get_key_value(&name).map(|(k, _)| k.as_str())
    }
}
