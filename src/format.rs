//! The MBW1 file format.
//!
//! All integers are little-endian:
//!
//! | bytes            | content                                          |
//! |------------------|--------------------------------------------------|
//! | 4                | magic, ASCII `MBW1`                              |
//! | 2                | letter width in pixels, non-zero                 |
//! | 2                | letter height in pixels, non-zero                |
//! | 8                | letter count `n`                                 |
//! | 4 × `n`          | codepoint of every letter                        |
//! | ⌊`n`·`w`·`h`/8⌋  | pixels of all letters, one bit each, MSB first   |
//!
//! The pixel bits of all letters are concatenated without padding, each letter
//! row by row from the top. Bit `i` of the stream belongs to letter
//! `i / (w·h)`, in the same order as the codepoint table. When the total
//! number of bits is not a multiple of 8 the trailing partial byte is not part
//! of the file, so the last few pixels are not stored.

use std::io::{Read, Write};
use std::num::NonZeroU16;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{Error, Font, Result, Section};

/// Identifies MBW1 files.
pub const MAGIC: &[u8; 4] = b"MBW1";

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 16;

/// The fixed-size start of an MBW1 file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Width of every letter.
    pub width: NonZeroU16,
    /// Height of every letter.
    pub height: NonZeroU16,
    /// Number of letters in the file.
    pub letter_count: u64,
}

impl Header {
    /// Describes `font` as it is laid out right now.
    #[must_use]
    pub fn of(font: &Font) -> Self {
        let (width, height) = font.size();
        Self {
            width,
            height,
            letter_count: font.len() as u64,
        }
    }

    /// Reads and validates a header.
    ///
    /// # Errors
    ///
    /// Fails if the stream ends early, the magic is wrong, or a dimension is 0.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let reading = |e| Error::reading(Section::Header, e);

        let mut magic = [0; 4];
        reader.read_exact(&mut magic).map_err(reading)?;
        let width = reader.read_u16::<LittleEndian>().map_err(reading)?;
        let height = reader.read_u16::<LittleEndian>().map_err(reading)?;
        let letter_count = reader.read_u64::<LittleEndian>().map_err(reading)?;

        if &magic != MAGIC {
            return Err(Error::BadMagic { found: magic });
        }
        let (Some(w), Some(h)) = (NonZeroU16::new(width), NonZeroU16::new(height)) else {
            return Err(Error::ZeroDimension { width, height });
        };

        Ok(Self {
            width: w,
            height: h,
            letter_count,
        })
    }

    /// Writes the header.
    ///
    /// # Errors
    ///
    /// Fails if the writer does.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let writing = Error::writing(Section::Header);
        writer.write_all(MAGIC).map_err(writing)?;
        writer.write_u16::<LittleEndian>(self.width.get()).map_err(writing)?;
        writer.write_u16::<LittleEndian>(self.height.get()).map_err(writing)?;
        writer.write_u64::<LittleEndian>(self.letter_count).map_err(writing)
    }

    /// Number of pixels in one letter.
    #[must_use]
    pub fn letter_area(&self) -> usize {
        usize::from(self.width.get()) * usize::from(self.height.get())
    }
}

/// Position of global pixel bit `n`: byte offset and mask within that byte.
fn bit(n: usize) -> (usize, u8) {
    (n / 8, 0x80 >> (n % 8))
}

/// Number of bytes holding the pixels of `letters` letters of `area` pixels each.
fn bitmap_len(letters: usize, area: usize) -> Option<usize> {
    letters.checked_mul(area).map(|bits| bits / 8)
}

/// Reads a font from `reader`.
///
/// Letters are added in the order of the file's character table. A character
/// listed more than once ends up as a single letter holding the union of the
/// listed bitmaps. Data following the bitmap is left unread.
///
/// # Errors
///
/// Fails if the header is invalid, a codepoint is not a valid `char`, or
/// `reader` ends or fails before all sections are read. No font is returned
/// in that case.
pub fn read<R: Read>(mut reader: R) -> Result<Font> {
    let header = Header::read(&mut reader)?;
    log::trace!(
        "MBW1 header: {}x{}, {} letters",
        header.width,
        header.height,
        header.letter_count
    );

    let characters = read_characters(&mut reader, header.letter_count)?;

    let area = header.letter_area();
    let len = bitmap_len(characters.len(), area).ok_or(Error::TooLarge {
        letters: header.letter_count,
    })?;
    let mut bits = Vec::new();
    (&mut reader)
        .take(len as u64)
        .read_to_end(&mut bits)
        .map_err(|e| Error::reading(Section::Bitmap, e))?;
    if bits.len() < len {
        return Err(Error::Truncated {
            section: Section::Bitmap,
        });
    }

    let mut font = Font::new(header.width, header.height);
    for (i, &character) in characters.iter().enumerate() {
        let mut letter = font.letter(character);
        for (p, pixel) in letter.pixels_mut().iter_mut().enumerate() {
            let (byte, mask) = bit(i * area + p);
            if bits.get(byte).is_some_and(|b| b & mask != 0) {
                *pixel = true;
            }
        }
    }

    if font.len() != characters.len() {
        log::warn!(
            "character table lists {} letters but only {} are distinct",
            characters.len(),
            font.len()
        );
    }
    log::debug!(
        "read {}x{} font with {} letters",
        font.width(),
        font.height(),
        font.len()
    );
    Ok(font)
}

fn read_characters<R: Read>(reader: &mut R, count: u64) -> Result<Vec<char>> {
    // The count is untrusted; let the table grow as entries actually arrive.
    let mut characters = Vec::with_capacity(usize::try_from(count.min(4096)).unwrap_or(4096));
    for index in 0..count {
        let value = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| Error::reading(Section::Characters, e))?;
        let character = char::from_u32(value).ok_or(Error::InvalidCharacter { index, value })?;
        characters.push(character);
    }
    Ok(characters)
}

/// Writes `font` to `writer`.
///
/// The character table and bitmap follow the font's current letter order.
///
/// # Errors
///
/// Fails if `writer` does, or if the font's bitmap cannot be addressed in
/// memory.
pub fn write<W: Write>(mut writer: W, font: &Font) -> Result<()> {
    let header = Header::of(font);
    header.write(&mut writer)?;

    let mut table = Vec::with_capacity(font.len() * 4);
    for letter in font.letters() {
        table
            .write_u32::<LittleEndian>(u32::from(letter.character()))
            .map_err(Error::writing(Section::Characters))?;
    }
    writer
        .write_all(&table)
        .map_err(Error::writing(Section::Characters))?;

    let area = header.letter_area();
    let len = bitmap_len(font.len(), area).ok_or(Error::TooLarge {
        letters: header.letter_count,
    })?;
    let mut bits = vec![0u8; len];
    for (i, letter) in font.letters().iter().enumerate() {
        for (p, &set) in letter.pixels().iter().enumerate() {
            let (byte, mask) = bit(i * area + p);
            if let (true, Some(b)) = (set, bits.get_mut(byte)) {
                *b |= mask;
            }
        }
    }
    writer
        .write_all(&bits)
        .map_err(Error::writing(Section::Bitmap))?;

    log::debug!(
        "wrote {}x{} font with {} letters",
        font.width(),
        font.height(),
        font.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io;

    use pretty_assertions::assert_eq;

    use super::*;

    fn font(width: u16, height: u16) -> Font {
        Font::new(
            NonZeroU16::new(width).unwrap(),
            NonZeroU16::new(height).unwrap(),
        )
    }

    fn encode(font: &Font) -> Vec<u8> {
        let mut buf = Vec::new();
        write(&mut buf, font).unwrap();
        buf
    }

    fn header_bytes(magic: &[u8; 4], width: u16, height: u16, count: u64) -> Vec<u8> {
        let mut buf = magic.to_vec();
        buf.extend_from_slice(&width.to_le_bytes());
        buf.extend_from_slice(&height.to_le_bytes());
        buf.extend_from_slice(&count.to_le_bytes());
        buf
    }

    #[test]
    fn reads_written_font() {
        let mut font = font(14, 8);
        font.letter('A').set(1, 2, true);
        font.letter('B').set(2, 3, true);
        font.letter('B').set(3, 4, true);

        let have = read(encode(&font).as_slice()).unwrap();
        assert_eq!(have.width(), 14);
        assert_eq!(have.height(), 8);
        assert_eq!(have.len(), 2);

        let a = have.get('A').unwrap();
        let b = have.get('B').unwrap();
        for y in 0..8 {
            for x in 0..14 {
                assert_eq!(a.get(x, y), (x, y) == (1, 2), "A at ({x}, {y})");
                assert_eq!(b.get(x, y), (x, y) == (2, 3) || (x, y) == (3, 4), "B at ({x}, {y})");
            }
        }
        assert_eq!(have, font);
    }

    #[test]
    fn writes_exact_layout() {
        let mut font = font(4, 2);
        font.letter('A').set(0, 0, true);
        font.letter('€').set(3, 1, true);

        let mut expected = header_bytes(MAGIC, 4, 2, 2);
        expected.extend_from_slice(&0x41u32.to_le_bytes());
        expected.extend_from_slice(&0x20acu32.to_le_bytes());
        // Letter 0 is bits 0..8, letter 1 is bits 8..16.
        expected.extend_from_slice(&[0b1000_0000, 0b0000_0001]);

        assert_eq!(encode(&font), expected);
    }

    #[test]
    fn bits_run_across_letter_boundaries() {
        // 3x4 letters: twelve bits each, so the second letter starts mid-byte.
        let mut font = font(3, 4);
        font.letter('a').set(2, 3, true);
        font.letter('b').set(0, 0, true);
        font.letter('b').set(2, 3, true);

        let buf = encode(&font);
        assert_eq!(&buf[HEADER_LEN + 8..], &[0, 0b0001_1000, 0b0000_0001]);
        assert_eq!(read(buf.as_slice()).unwrap(), font);
    }

    #[test]
    fn empty_font_is_just_a_header() {
        let font = font(8, 8);
        let buf = encode(&font);
        assert_eq!(buf, header_bytes(MAGIC, 8, 8, 0));
        let have = read(buf.as_slice()).unwrap();
        assert!(have.is_empty());
        assert_eq!((have.width(), have.height()), (8, 8));
    }

    #[test]
    fn encodes_current_order() {
        let mut font = font(8, 1);
        font.letter('b').set(0, 0, true);
        font.letter('a').set(7, 0, true);
        font.sort();

        let buf = encode(&font);
        assert_eq!(&buf[HEADER_LEN..HEADER_LEN + 4], &0x61u32.to_le_bytes());
        assert_eq!(&buf[HEADER_LEN + 8..], &[0b0000_0001, 0b1000_0000]);

        let have = read(buf.as_slice()).unwrap();
        let order: Vec<char> = have.letters().iter().map(crate::Letter::character).collect();
        assert_eq!(order, vec!['a', 'b']);
    }

    #[test]
    fn partial_last_byte_is_not_stored() {
        // 3x3 = 9 bits, of which only the first 8 fit into the stored byte.
        let mut font = font(3, 3);
        let mut letter = font.letter('x');
        letter.set(0, 0, true);
        letter.set(2, 2, true);

        let buf = encode(&font);
        assert_eq!(buf.len(), HEADER_LEN + 4 + 1);
        assert_eq!(buf[HEADER_LEN + 4], 0b1000_0000);

        let have = read(buf.as_slice()).unwrap();
        let x = have.get('x').unwrap();
        assert!(x.get(0, 0));
        assert!(!x.get(2, 2));
    }

    #[test]
    fn duplicate_characters_are_merged() {
        let mut buf = header_bytes(MAGIC, 4, 2, 2);
        buf.extend_from_slice(&0x41u32.to_le_bytes());
        buf.extend_from_slice(&0x41u32.to_le_bytes());
        buf.extend_from_slice(&[0b1000_0000, 0b0000_0001]);

        let font = read(buf.as_slice()).unwrap();
        assert_eq!(font.len(), 1);
        let a = font.get('A').unwrap();
        assert!(a.get(0, 0));
        assert!(a.get(3, 1));
    }

    #[test]
    fn trailing_data_is_left_in_the_stream() {
        let mut font = font(8, 1);
        font.letter('z').set(4, 0, true);
        let mut buf = encode(&font);
        buf.extend_from_slice(b"rest");

        let mut reader = buf.as_slice();
        assert_eq!(read(&mut reader).unwrap(), font);
        assert_eq!(reader, b"rest");
    }

    #[test]
    fn rejects_bad_magic() {
        let buf = header_bytes(b"MBW2", 8, 8, 0);
        let err = read(buf.as_slice()).unwrap_err();
        assert!(matches!(err, Error::BadMagic { found } if &found == b"MBW2"), "{err}");
    }

    #[test]
    fn rejects_zero_width_and_height() {
        for (w, h) in [(0, 8), (8, 0), (0, 0)] {
            let buf = header_bytes(MAGIC, w, h, 0);
            let err = read(buf.as_slice()).unwrap_err();
            assert!(
                matches!(err, Error::ZeroDimension { width, height } if (width, height) == (w, h)),
                "{err}"
            );
        }
    }

    #[test]
    fn reports_truncation_per_section() {
        let mut font = font(8, 2);
        font.letter('a').set(1, 1, true);
        font.letter('b').set(2, 0, true);
        let buf = encode(&font);

        let cases = [
            (0, Section::Header),
            (HEADER_LEN - 1, Section::Header),
            (HEADER_LEN, Section::Characters),
            (HEADER_LEN + 5, Section::Characters),
            (HEADER_LEN + 8, Section::Bitmap),
            (buf.len() - 1, Section::Bitmap),
        ];
        for (len, section) in cases {
            let err = read(&buf[..len]).unwrap_err();
            assert!(
                matches!(err, Error::Truncated { section: s } if s == section),
                "{len} bytes: {err}"
            );
        }
    }

    #[test]
    fn rejects_invalid_codepoints() {
        let mut buf = header_bytes(MAGIC, 8, 1, 2);
        buf.extend_from_slice(&0x41u32.to_le_bytes());
        buf.extend_from_slice(&0xD800u32.to_le_bytes());
        buf.extend_from_slice(&[0, 0]);

        let err = read(buf.as_slice()).unwrap_err();
        assert!(
            matches!(err, Error::InvalidCharacter { index: 1, value: 0xD800 }),
            "{err}"
        );
    }

    #[test]
    fn huge_letter_count_fails_without_allocating() {
        let buf = header_bytes(MAGIC, 8, 8, u64::MAX);
        let err = read(buf.as_slice()).unwrap_err();
        assert!(matches!(err, Error::Truncated { section: Section::Characters }), "{err}");
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn reader_errors_are_not_truncation() {
        let err = read(BrokenReader).unwrap_err();
        assert!(matches!(err, Error::Read { section: Section::Header, .. }), "{err}");
        assert!(err.to_string().contains("disk on fire"));
    }

    /// Accepts `budget` bytes, then fails every write.
    struct FailingWriter {
        budget: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            let n = buf.len().min(self.budget);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn reports_write_failures_per_section() {
        let mut font = font(8, 1);
        font.letter('a').set(0, 0, true);

        for (budget, section) in [
            (0, Section::Header),
            (HEADER_LEN, Section::Characters),
            (HEADER_LEN + 4, Section::Bitmap),
        ] {
            let err = write(FailingWriter { budget }, &font).unwrap_err();
            assert!(
                matches!(err, Error::Write { section: s, .. } if s == section),
                "budget {budget}: {err}"
            );
            assert_eq!(err.section(), Some(section));
        }
    }
}
