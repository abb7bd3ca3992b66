use std::io;
use std::num::NonZeroU16;
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

use crate::Font;

/// Letters converted when no charset is given on the command line.
const DEFAULT_EXTRA_LETTERS: [char; 11] = ['ä', 'ö', 'ü', 'Ä', 'Ö', 'Ü', 'ß', '$', 'µ', '€', '°'];

/// Command line arguments of `ttf2mbw`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the font file to convert
    pub font_path: PathBuf,
    /// Path to where the MBW font should be written
    pub mbw_path: PathBuf,
    /// List of Unicode codepoint ranges written in hex
    pub charset: Vec<String>,
    /// Desired font pixel height
    #[arg(short, long, default_value_t = 20.0)]
    pub scale: f32,
    /// Minimum coverage (0-255) at which a pixel is set
    #[arg(short, long, default_value_t = 100)]
    pub threshold: u8,
    /// Keep letters in charset order instead of sorting them by codepoint
    #[arg(long)]
    pub no_sort: bool,
    /// Path to where a PNG preview of all letters should be written
    #[arg(long)]
    pub preview: Option<PathBuf>,
    /// Path to where the font should additionally be written as RON or JSON
    #[arg(long)]
    pub meta: Option<PathBuf>,
}

/// Failures of the converter.
#[derive(Debug, Error)]
pub enum Error {
    /// The input font could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    ReadFont {
        /// The input font.
        path: PathBuf,
        /// The error reported by the OS.
        source: io::Error,
    },

    /// The input is not a font `rusttype` understands.
    #[error("failed to parse font data in '{}'", path.display())]
    ParseFont {
        /// The input font.
        path: PathBuf,
    },

    /// Some charset specifiers were malformed.
    #[error(
        "invalid charset specifiers: {}; use hex codepoints such as 5F or ranges such as 20-7f",
        .0.join(", ")
    )]
    Charset(Vec<String>),

    /// The requested scale yields an empty or oversized letter.
    #[error("letter size {width}x{height} cannot be stored, try another scale")]
    LetterSize {
        /// Rounded advance width of `M`.
        width: f32,
        /// Rounded ascent minus descent.
        height: f32,
    },

    /// Writing the MBW file failed.
    #[error(transparent)]
    Mbw(#[from] crate::Error),

    /// Writing the preview image failed.
    #[error("failed to write preview image: {0}")]
    Preview(#[from] image::ImageError),

    /// The metadata path has an unsupported extension.
    #[error("failed to deduce metadata format from '{}'; supported formats are ron and json", path.display())]
    MetaFormat {
        /// The requested path.
        path: PathBuf,
    },

    /// Serializing to RON failed.
    #[error("failed to serialize font: {0}")]
    Ron(#[from] ron::Error),

    /// Serializing to JSON failed.
    #[error("failed to serialize font: {0}")]
    Json(#[from] serde_json::Error),

    /// The metadata file could not be written.
    #[error("failed to write '{}': {source}", path.display())]
    WriteMeta {
        /// The requested path.
        path: PathBuf,
        /// The error reported by the OS.
        source: io::Error,
    },
}

/// Converts a TrueType font as described by `args`.
///
/// # Errors
///
/// Fails if any input cannot be read or any output cannot be written.
pub fn run(args: &Args) -> Result<(), Error> {
    let font_data = std::fs::read(&args.font_path).map_err(|source| Error::ReadFont {
        path: args.font_path.clone(),
        source,
    })?;
    let ttf = rusttype::Font::try_from_vec(font_data).ok_or_else(|| Error::ParseFont {
        path: args.font_path.clone(),
    })?;

    let charset = parse_charset(&args.charset)?;
    let mut font = rasterize(&ttf, &charset, args.scale, args.threshold)?;
    if !args.no_sort {
        font.sort();
    }

    crate::save(&font, &args.mbw_path)?;
    log::info!(
        "wrote {} letters of {}x{} pixels to {}",
        font.len(),
        font.width(),
        font.height(),
        args.mbw_path.display()
    );

    if let Some(path) = &args.preview {
        font_to_image(&font).save(path)?;
    }
    if let Some(path) = &args.meta {
        write_meta(&font, path)?;
    }
    Ok(())
}

/// Parses charset specifiers: single hex codepoints (`5F`) or inclusive hex
/// ranges (`20-7f`). Characters keep the order of their first mention.
///
/// Without specifiers, printable ASCII and a few common Latin-1 letters and
/// symbols are returned.
///
/// # Errors
///
/// Lists every specifier that is malformed or names an invalid codepoint.
pub fn parse_charset(specifiers: &[String]) -> Result<Vec<char>, Error> {
    let mut charset = Vec::new();
    if specifiers.is_empty() {
        log::info!("no charset specified, using ASCII 21-7e and common Latin-1 letters");
        let ascii = (0x21u8..=0x7E).map(char::from);
        for c in DEFAULT_EXTRA_LETTERS.into_iter().chain(ascii) {
            if !charset.contains(&c) {
                charset.push(c);
            }
        }
        return Ok(charset);
    }

    let mut errors = Vec::new();
    for arg in specifiers {
        let mut pieces = arg.split('-');
        let range = match (pieces.next(), pieces.next(), pieces.next()) {
            (Some(single), None, None) => u32::from_str_radix(single, 16).map(|c| c..=c),
            (Some(min), Some(max), None) => u32::from_str_radix(min, 16)
                .and_then(|min| u32::from_str_radix(max, 16).map(|max| min..=max)),
            _ => {
                errors.push(arg.clone());
                continue;
            }
        };
        let Ok(range) = range else {
            errors.push(arg.clone());
            continue;
        };
        if range.is_empty() {
            errors.push(arg.clone());
            continue;
        }

        let Some(chars) = range.map(char::from_u32).collect::<Option<Vec<_>>>() else {
            log::error!("{arg} contains codepoints that are not valid Unicode scalar values");
            errors.push(arg.clone());
            continue;
        };
        for c in chars {
            if !charset.contains(&c) {
                charset.push(c);
            }
        }
    }

    if errors.is_empty() {
        Ok(charset)
    } else {
        Err(Error::Charset(errors))
    }
}

/// Renders `charset` from `ttf` into a new [`Font`].
///
/// The letter height is the rounded ascent plus descent at `scale` pixels, the
/// width is the advance of `M`. A pixel is set if the glyph covers it at least
/// `threshold / 255`. Parts of glyphs outside the letter are cut off.
///
/// # Errors
///
/// Fails if `scale` produces a letter size that cannot be stored.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn rasterize(
    ttf: &rusttype::Font<'_>,
    charset: &[char],
    scale: f32,
    threshold: u8,
) -> Result<Font, Error> {
    let scale = rusttype::Scale::uniform(scale);
    let rusttype::VMetrics {
        ascent, descent, ..
    } = ttf.v_metrics(scale);
    let ascent = ascent.round();
    let width = ttf.glyph('M').scaled(scale).h_metrics().advance_width.round();
    let height = ascent - descent.round();

    let letter_side = |v: f32| {
        (1.0..=f32::from(u16::MAX))
            .contains(&v)
            .then(|| NonZeroU16::new(v as u16))
            .flatten()
    };
    let (Some(w), Some(h)) = (letter_side(width), letter_side(height)) else {
        return Err(Error::LetterSize { width, height });
    };
    log::debug!("letter size {w}x{h}, ascent {ascent}");

    let mut font = Font::new(w, h);
    for &c in charset {
        let glyph = ttf.glyph(c);
        if glyph.id().0 == 0 && !c.is_whitespace() {
            log::warn!("font has no glyph for {c:?} (U+{:04X})", u32::from(c));
        }
        let glyph = glyph.scaled(scale).positioned(rusttype::point(0.0, ascent));

        let mut letter = font.letter(c);
        let Some(bounds) = glyph.pixel_bounding_box() else {
            continue;
        };
        if bounds.min.x < 0
            || bounds.min.y < 0
            || bounds.max.x > i32::from(w.get())
            || bounds.max.y > i32::from(h.get())
        {
            log::warn!(
                "letter {c:?} has size {}x{} at {},{} and is cut off",
                bounds.width(),
                bounds.height(),
                bounds.min.x,
                bounds.min.y
            );
        }

        glyph.draw(|x, y, v| {
            let level = (v * 255.0).round() as u8;
            letter.set(
                bounds.min.x + x as i32,
                bounds.min.y + y as i32,
                level >= threshold,
            );
        });
    }
    Ok(font)
}

/// Lays out all letters of `font` side by side in one grayscale image.
///
/// Set pixels are white; every other letter sits on a dark gray background so
/// the letter boundaries stay visible.
#[must_use]
pub fn font_to_image(font: &Font) -> image::GrayImage {
    let width = u32::from(font.width());
    let height = u32::from(font.height());
    let count = u32::try_from(font.len()).unwrap_or(u32::MAX);

    let mut image = image::GrayImage::new(width.saturating_mul(count), height);
    for (i, letter) in (0..count).zip(font.letters()) {
        let background = if i % 2 == 1 { 50 } else { 0 };
        for y in 0..font.height() {
            for x in 0..font.width() {
                let value = if letter.get(i32::from(x), i32::from(y)) {
                    0xFF
                } else {
                    background
                };
                image.put_pixel(i * width + u32::from(x), u32::from(y), image::Luma([value]));
            }
        }
    }
    image
}

fn write_meta(font: &Font, path: &Path) -> Result<(), Error> {
    let serialized = match path.extension().and_then(|ext| ext.to_str()) {
        Some("ron") => ron::ser::to_string_pretty(font, ron::ser::PrettyConfig::default())?,
        Some("json") => serde_json::to_string(font)?,
        _ => {
            return Err(Error::MetaFormat {
                path: path.to_owned(),
            })
        }
    };
    std::fs::write(path, serialized).map_err(|source| Error::WriteMeta {
        path: path.to_owned(),
        source,
    })
}
