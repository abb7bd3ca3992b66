use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::{format, Error, Font, Result};

/// Reads a font from the MBW1 file at `path`.
///
/// # Errors
///
/// Fails if the file cannot be opened or does not hold a valid font.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Font> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_owned(),
        source,
    })?;
    let font = format::read(BufReader::new(file))?;
    log::debug!("loaded {} letters from {}", font.len(), path.display());
    Ok(font)
}

/// Writes `font` to an MBW1 file at `path`, replacing any existing file.
///
/// # Errors
///
/// Fails if the file cannot be created or written.
pub fn save<P: AsRef<Path>>(font: &Font, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::Create {
        path: path.to_owned(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    format::write(&mut writer, font)?;
    writer.flush().map_err(|source| Error::Flush {
        path: path.to_owned(),
        source,
    })?;
    log::debug!("saved {} letters to {}", font.len(), path.display());
    Ok(())
}
