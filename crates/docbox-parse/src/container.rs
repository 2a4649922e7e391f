//! In-memory ZIP container access shared by the OOXML backends.

use std::io::{Cursor, Read};

use docbox_core::{ExtractError, SourceType};
use zip::ZipArchive;

/// An OOXML container opened from a byte buffer.
#[derive(Debug)]
pub struct Container {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    format: SourceType,
}

impl Container {
    /// Open a ZIP container. `format` is used only for error classification.
    pub fn open(bytes: &[u8], format: SourceType) -> Result<Self, ExtractError> {
        let archive = ZipArchive::new(Cursor::new(bytes.to_vec()))
            .map_err(|_| ExtractError::Malformed { format })?;
        Ok(Self { archive, format })
    }

    /// Names of every entry in the container.
    pub fn entry_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    /// Read a required entry; a missing entry is
    /// [`ExtractError::MissingEntry`].
    pub fn read(&mut self, name: &str) -> Result<Vec<u8>, ExtractError> {
        let mut file = self
            .archive
            .by_name(name)
            .map_err(|_| ExtractError::MissingEntry {
                name: name.to_string(),
            })?;
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data).map_err(|_| ExtractError::Malformed {
            format: self.format,
        })?;
        Ok(data)
    }

    /// Read an entry that may legitimately be absent (e.g. a workbook without
    /// shared strings).
    pub fn read_optional(&mut self, name: &str) -> Result<Option<Vec<u8>>, ExtractError> {
        match self.read(name) {
            Ok(data) => Ok(Some(data)),
            Err(ExtractError::MissingEntry { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
