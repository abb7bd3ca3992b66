use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Shorthand for results of MBW operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The part of an MBW1 file an I/O failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Magic, letter size and letter count.
    Header,
    /// The table of codepoints, one per letter.
    Characters,
    /// The packed pixel data of all letters.
    Bitmap,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Section::Header => "header",
            Section::Characters => "character table",
            Section::Bitmap => "bitmap data",
        })
    }
}

/// Everything that can go wrong while reading or writing a font.
#[derive(Debug, Error)]
pub enum Error {
    // === Format errors ===
    /// The file does not start with `MBW1`.
    #[error("unknown file header: expected magic \"MBW1\", found {found:02x?}")]
    BadMagic {
        /// The four bytes found in place of the magic.
        found: [u8; 4],
    },

    /// The header declares a letter size with a zero side.
    #[error("unknown file header: letter size {width}x{height} has a zero dimension")]
    ZeroDimension {
        /// Declared letter width.
        width: u16,
        /// Declared letter height.
        height: u16,
    },

    /// An entry of the character table is not a Unicode scalar value.
    #[error("character table entry {index} is not a valid codepoint: {value:#x}")]
    InvalidCharacter {
        /// Position of the entry in the table.
        index: u64,
        /// The raw value read.
        value: u32,
    },

    /// The bitmap of the declared letters cannot be addressed on this platform.
    #[error("bitmap data of {letters} letters does not fit into memory")]
    TooLarge {
        /// Number of letters in the character table.
        letters: u64,
    },

    /// A deserialized letter does not have the size of its font.
    #[cfg(feature = "serde-deserialize")]
    #[error("letter {character:?} has {pixels} pixels, expected {expected}")]
    LetterSize {
        /// The offending letter.
        character: char,
        /// Number of pixels it carries.
        pixels: usize,
        /// `width * height` of the font.
        expected: usize,
    },

    /// A deserialized font contains the same character twice.
    #[cfg(feature = "serde-deserialize")]
    #[error("letter {0:?} appears more than once")]
    DuplicateLetter(char),

    // === Truncation errors ===
    /// The stream ended before a section was complete.
    #[error("failed to read {section}: unexpected end of data")]
    Truncated {
        /// The incomplete section.
        section: Section,
    },

    // === I/O errors ===
    /// The underlying reader failed.
    #[error("failed to read {section}: {source}")]
    Read {
        /// The section being read.
        section: Section,
        /// The reader's error.
        source: io::Error,
    },

    /// The underlying writer failed.
    #[error("failed to write {section}: {source}")]
    Write {
        /// The section being written.
        section: Section,
        /// The writer's error.
        source: io::Error,
    },

    /// A font file could not be opened.
    #[error("failed to open '{}': {source}", path.display())]
    Open {
        /// The file that was requested.
        path: PathBuf,
        /// The error reported by the OS.
        source: io::Error,
    },

    /// A font file could not be created.
    #[error("failed to create '{}': {source}", path.display())]
    Create {
        /// The file that was requested.
        path: PathBuf,
        /// The error reported by the OS.
        source: io::Error,
    },

    /// Buffered data could not be flushed to a font file.
    #[error("failed to flush '{}': {source}", path.display())]
    Flush {
        /// The file being written.
        path: PathBuf,
        /// The error reported by the OS.
        source: io::Error,
    },
}

impl Error {
    /// Wraps a read failure, telling a premature end of stream apart from other errors.
    pub(crate) fn reading(section: Section, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::UnexpectedEof {
            Error::Truncated { section }
        } else {
            Error::Read { section, source }
        }
    }

    pub(crate) fn writing(section: Section) -> impl Fn(io::Error) -> Self + Copy {
        move |source| Error::Write { section, source }
    }

    /// The file section this error is attributed to, if any.
    #[must_use]
    pub fn section(&self) -> Option<Section> {
        match self {
            Error::BadMagic { .. } | Error::ZeroDimension { .. } => Some(Section::Header),
            Error::InvalidCharacter { .. } => Some(Section::Characters),
            Error::TooLarge { .. } => Some(Section::Bitmap),
            Error::Truncated { section }
            | Error::Read { section, .. }
            | Error::Write { section, .. } => Some(*section),
            _ => None,
        }
    }
}
