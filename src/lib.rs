//! Monospaced black-and-white bitmap fonts and the MBW1 file format.
//!
//! A [`Font`] is a set of [`Letter`]s that all share one pixel size. Letters
//! are created on first use and edited pixel by pixel; the whole font is
//! stored in a compact binary file (see [`format`]).
//!
//! # Usage
//! ## Building a font
//! ```
//! use std::num::NonZeroU16;
//!
//! let mut font = mbw::Font::new(NonZeroU16::new(8).unwrap(), NonZeroU16::new(14).unwrap());
//! let mut i = font.letter('i');
//! i.set(3, 2, true);
//! for y in 5..12 {
//!     i.set(3, y, true);
//! }
//! // Out-of-range writes are ignored, so unchecked coordinates are fine.
//! i.set(-1, 99, true);
//!
//! assert!(font.letter('i').get(3, 7));
//! assert!(!font.letter('i').get(-1, 99));
//! assert_eq!(font.len(), 1);
//! ```
//!
//! ## Reading and writing
//! ```
//! # fn test() -> mbw::Result<()> {
//! use std::num::NonZeroU16;
//!
//! let mut font = mbw::Font::new(NonZeroU16::new(14).unwrap(), NonZeroU16::new(8).unwrap());
//! font.letter('B').set(2, 3, true);
//! font.letter('A').set(1, 2, true);
//! font.sort();
//!
//! let mut bytes = Vec::new();
//! mbw::write(&mut bytes, &font)?;
//! assert_eq!(&bytes[..4], b"MBW1");
//!
//! let loaded = mbw::read(bytes.as_slice())?;
//! assert_eq!(loaded, font);
//! assert_eq!(loaded.letters()[0].character(), 'A');
//! # Ok(())
//! # }
//! # test().unwrap();
//! ```
//!
//! Files on disk go through [`load`] and [`save`], which take a path:
//! ```no_run
//! # fn test() -> mbw::Result<()> {
//! let mut font = mbw::load("font.mbw")?;
//! font.letter('€').set(0, 0, true);
//! mbw::save(&font, "font.mbw")?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docs_rs, feature(doc_cfg))]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]

mod error;
mod file;
mod font;
pub mod format;
mod letter;

pub use error::{Error, Result, Section};
pub use file::{load, save};
pub use font::Font;
pub use format::{read, write};
pub use letter::{Letter, LetterMut};

#[cfg(feature = "bin")]
mod cli;

#[cfg(feature = "bin")]
pub use cli::{font_to_image, parse_charset, rasterize, run, Args, Error as CliError};
