use std::ops::Deref;

/// A single character of a [`Font`](crate::Font), drawn as a grid of
/// black-and-white pixels.
///
/// Pixels are addressed by `x` growing from left to right and `y` growing
/// from top to bottom, both starting at 0. Coordinates outside the grid are
/// accepted everywhere: they read as unset and ignore writes, so callers may
/// pass unchecked positions (e.g. derived from a mouse cursor).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize))]
#[cfg_attr(
    feature = "serde-deserialize",
    derive(serde::Deserialize),
    serde(try_from = "LetterData")
)]
pub struct Letter {
    character: char,
    width: u16,
    height: u16,
    pixels: Vec<bool>,
}

impl Letter {
    /// Creates a letter with every pixel unset.
    pub(crate) fn blank(character: char, width: u16, height: u16) -> Self {
        Self {
            character,
            width,
            height,
            pixels: vec![false; usize::from(width) * usize::from(height)],
        }
    }

    /// The character this letter depicts.
    #[must_use]
    pub fn character(&self) -> char {
        self.character
    }

    /// Width of the pixel grid.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height of the pixel grid.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Returns `true` if the pixel at `(x, y)` is set.
    ///
    /// Positions outside the grid are never set.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> bool {
        self.offset(x, y).is_some_and(|i| self.pixels[i])
    }

    /// Sets or clears the pixel at `(x, y)`.
    ///
    /// Does nothing if the position lies outside the grid.
    pub fn set(&mut self, x: i32, y: i32, value: bool) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i] = value;
        }
    }

    /// Unsets every pixel.
    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    /// Returns `true` if no pixel is set.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        !self.pixels.contains(&true)
    }

    /// All pixels in row-major order, top row first.
    pub(crate) fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|&x| x < usize::from(self.width))?;
        let y = usize::try_from(y).ok().filter(|&y| y < usize::from(self.height))?;
        Some(y * usize::from(self.width) + x)
    }
}

/// Pixel access to a letter owned by a [`Font`](crate::Font).
///
/// Reads go through [`Deref`] to [`Letter`]. Writes are limited to pixels, so
/// the letter keeps its character and size and the font stays consistent:
///
/// ```compile_fail
/// # use std::num::NonZeroU16;
/// let one = NonZeroU16::MIN;
/// let mut font = mbw::Font::new(one, one);
/// let mut other = mbw::Font::new(NonZeroU16::new(8).unwrap(), one);
/// *font.letter('a') = other.letter('q').clone();
/// ```
#[derive(Debug)]
pub struct LetterMut<'a>(&'a mut Letter);

impl<'a> LetterMut<'a> {
    pub(crate) fn new(letter: &'a mut Letter) -> Self {
        Self(letter)
    }

    /// Sets or clears the pixel at `(x, y)`.
    ///
    /// Does nothing if the position lies outside the grid.
    pub fn set(&mut self, x: i32, y: i32, value: bool) {
        self.0.set(x, y, value);
    }

    /// Unsets every pixel.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [bool] {
        &mut self.0.pixels
    }
}

impl Deref for LetterMut<'_> {
    type Target = Letter;

    fn deref(&self) -> &Letter {
        self.0
    }
}

#[cfg(feature = "serde-deserialize")]
#[derive(serde::Deserialize)]
struct LetterData {
    character: char,
    width: u16,
    height: u16,
    pixels: Vec<bool>,
}

#[cfg(feature = "serde-deserialize")]
impl TryFrom<LetterData> for Letter {
    type Error = crate::Error;

    fn try_from(data: LetterData) -> Result<Self, Self::Error> {
        let expected = usize::from(data.width) * usize::from(data.height);
        if data.pixels.len() != expected {
            return Err(crate::Error::LetterSize {
                character: data.character,
                pixels: data.pixels.len(),
                expected,
            });
        }
        Ok(Self {
            character: data.character,
            width: data.width,
            height: data.height,
            pixels: data.pixels,
        })
    }
}
