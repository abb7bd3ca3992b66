use std::collections::HashMap;
use std::num::NonZeroU16;

use crate::{Letter, LetterMut};

/// A monospaced black-and-white font.
///
/// Every letter is [`width`](Font::width) by [`height`](Font::height) pixels
/// in size. A new font contains no letters; they are added the first time
/// they are requested through [`Font::letter`]. Letters keep the order in
/// which they were added until [`Font::sort`] is called.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize))]
#[cfg_attr(
    feature = "serde-deserialize",
    derive(serde::Deserialize),
    serde(try_from = "FontData")
)]
pub struct Font {
    width: NonZeroU16,
    height: NonZeroU16,
    letters: Vec<Letter>,
    #[cfg_attr(
        any(feature = "serde-serialize", feature = "serde-deserialize"),
        serde(skip)
    )]
    index: HashMap<char, usize>,
}

impl Font {
    /// Creates an empty font in which every letter is `width` by `height` pixels.
    #[must_use]
    pub fn new(width: NonZeroU16, height: NonZeroU16) -> Self {
        Self {
            width,
            height,
            letters: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Width of a letter in pixels.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width.get()
    }

    /// Height of a letter in pixels.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height.get()
    }

    pub(crate) fn size(&self) -> (NonZeroU16, NonZeroU16) {
        (self.width, self.height)
    }

    /// Number of letters in the font.
    #[must_use]
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    /// Returns `true` if the font has no letters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// All letters, in insertion order or in the order established by the
    /// last call to [`Font::sort`].
    #[must_use]
    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    /// Iterates over the pixels of all letters, in the same order as
    /// [`Font::letters`].
    pub fn letters_mut(&mut self) -> impl ExactSizeIterator<Item = LetterMut<'_>> {
        self.letters.iter_mut().map(LetterMut::new)
    }

    /// Returns the letter for `character`, creating a blank one at the end of
    /// the font if it is not present yet.
    pub fn letter(&mut self, character: char) -> LetterMut<'_> {
        let i = match self.index.get(&character) {
            Some(&i) => i,
            None => {
                self.letters
                    .push(Letter::blank(character, self.width(), self.height()));
                self.index.insert(character, self.letters.len() - 1);
                self.letters.len() - 1
            }
        };
        LetterMut::new(&mut self.letters[i])
    }

    /// Returns the letter for `character` if the font contains it.
    #[must_use]
    pub fn get(&self, character: char) -> Option<&Letter> {
        self.index.get(&character).map(|&i| &self.letters[i])
    }

    /// Orders the letters by character, lowest codepoint first.
    pub fn sort(&mut self) {
        self.letters.sort_by_key(Letter::character);
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = self
            .letters
            .iter()
            .enumerate()
            .map(|(i, letter)| (letter.character(), i))
            .collect();
    }
}

impl PartialEq for Font {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.letters == other.letters
    }
}

impl Eq for Font {}

#[cfg(feature = "serde-deserialize")]
#[derive(serde::Deserialize)]
struct FontData {
    width: NonZeroU16,
    height: NonZeroU16,
    letters: Vec<Letter>,
}

#[cfg(feature = "serde-deserialize")]
impl TryFrom<FontData> for Font {
    type Error = crate::Error;

    fn try_from(data: FontData) -> Result<Self, Self::Error> {
        let mut font = Font::new(data.width, data.height);
        let expected = usize::from(font.width()) * usize::from(font.height());
        for letter in data.letters {
            if letter.width() != font.width()
                || letter.height() != font.height()
                || letter.pixels().len() != expected
            {
                return Err(crate::Error::LetterSize {
                    character: letter.character(),
                    pixels: letter.pixels().len(),
                    expected,
                });
            }
            if font.index.contains_key(&letter.character()) {
                return Err(crate::Error::DuplicateLetter(letter.character()));
            }
            font.index.insert(letter.character(), font.letters.len());
            font.letters.push(letter);
        }
        Ok(font)
    }
}
