use thiserror::Error;

/// Number of 8-bit channels per pixel (RGBA).
pub const CHANNELS: usize = 4;

/// Sample value written after the last frame byte.
pub const FILLER: u8 = 0x00;

/// Errors returned when sizing or validating a pixel grid.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum PixelGridError {
    /// Width or height is zero.
    #[error("pixel grid dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },
    /// The byte count needs more pixels than a `u32` by `u32` grid can hold.
    #[error("{byte_len} bytes cannot be rasterized into a representable pixel grid")]
    DimensionsOverflow { byte_len: usize },
    /// The grid sample count cannot be represented as an in-memory length.
    #[error("sample count overflows platform usize for pixel grid {dimensions}")]
    SampleCountOverflow { dimensions: GridDimensions },
    /// The sample buffer does not match `width * height * 4`.
    #[error(
        "pixel grid sample count mismatch for {dimensions}: expected {expected_len} samples, got {actual_len}"
    )]
    LengthMismatch {
        dimensions: GridDimensions,
        expected_len: usize,
        actual_len: usize,
    },
}

/// Width and height of a pixel grid, both non-zero.
#[derive(Debug, Clone, Copy, Eq, PartialEq, derive_more::Display)]
#[display("{width}x{height}")]
pub struct GridDimensions {
    width: u32,
    height: u32,
}

impl GridDimensions {
    /// Creates validated grid dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error when either side is zero.
    ///
    /// ```
    /// use pngify::GridDimensions;
    ///
    /// let dimensions = GridDimensions::new(3, 2)?;
    /// assert_eq!("3x2", dimensions.to_string());
    /// assert!(GridDimensions::new(0, 2).is_err());
    /// # Ok::<(), pngify::PixelGridError>(())
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self, PixelGridError> {
        if width == 0 || height == 0 {
            return Err(PixelGridError::EmptyDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Returns the smallest near-square grid that holds `byte_len` bytes.
    ///
    /// The pixel count is `max(1, ceil(byte_len / 4))`; the width is the
    /// ceiling of its square root and the height the rows needed at that
    /// width. Both sides grow monotonically with `byte_len`.
    ///
    /// # Errors
    ///
    /// Returns an error when a side would not fit in `u32`.
    ///
    /// ```
    /// use pngify::GridDimensions;
    ///
    /// // 17 bytes need 5 pixels: 3 columns, 2 rows.
    /// let dimensions = GridDimensions::for_byte_len(17)?;
    /// assert_eq!((3, 2), (dimensions.width(), dimensions.height()));
    /// # Ok::<(), pngify::PixelGridError>(())
    /// ```
    pub fn for_byte_len(byte_len: usize) -> Result<Self, PixelGridError> {
        let overflow = PixelGridError::DimensionsOverflow { byte_len };
        let pixels = u64::try_from(byte_len.div_ceil(CHANNELS))
            .map_err(|_overflow| overflow.clone())?
            .max(1);
        let width = ceil_sqrt(pixels);
        let height = pixels.div_ceil(width);
        let width = u32::try_from(width).map_err(|_overflow| overflow.clone())?;
        let height = u32::try_from(height).map_err(|_overflow| overflow)?;
        Self::new(width, height)
    }

    /// Returns the grid width in pixels.
    #[must_use]
    pub const fn width(self) -> u32 {
        self.width
    }

    /// Returns the grid height in pixels.
    #[must_use]
    pub const fn height(self) -> u32 {
        self.height
    }

    /// Returns the number of channel samples, `width * height * 4`.
    ///
    /// # Errors
    ///
    /// Returns an error if the count cannot fit in `usize` on this platform.
    pub fn sample_count(self) -> Result<usize, PixelGridError> {
        let pixels = u64::from(self.width) * u64::from(self.height);
        pixels
            .checked_mul(CHANNELS as u64)
            .and_then(|samples| usize::try_from(samples).ok())
            .ok_or(PixelGridError::SampleCountOverflow { dimensions: self })
    }

    /// Maps a `(row, col, channel)` coordinate to its position in the raster
    /// sample sequence. Rows run top to bottom, columns left to right, and the
    /// four channels of a pixel are adjacent.
    ///
    /// Returns `None` for coordinates outside the grid.
    ///
    /// ```
    /// use pngify::GridDimensions;
    ///
    /// let dimensions = GridDimensions::new(3, 2)?;
    /// assert_eq!(Some(0), dimensions.sample_index(0, 0, 0));
    /// assert_eq!(Some(13), dimensions.sample_index(1, 0, 1));
    /// assert_eq!(None, dimensions.sample_index(2, 0, 0));
    /// # Ok::<(), pngify::PixelGridError>(())
    /// ```
    #[must_use]
    pub fn sample_index(self, row: u32, col: u32, channel: usize) -> Option<usize> {
        if row >= self.height || col >= self.width || channel >= CHANNELS {
            return None;
        }
        let pixel = u64::from(row) * u64::from(self.width) + u64::from(col);
        let sample = pixel
            .checked_mul(CHANNELS as u64)?
            .checked_add(channel as u64)?;
        usize::try_from(sample).ok()
    }
}

/// RGBA sample grid carrying a linearized frame.
///
/// Samples are stored in the order defined by
/// [`GridDimensions::sample_index`], which is also the order PNG stores RGBA8
/// rows in.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PixelGrid {
    dimensions: GridDimensions,
    samples: Vec<u8>,
}

impl PixelGrid {
    /// Lays `bytes` out over the smallest grid that holds them, padding the
    /// remaining samples with [`FILLER`].
    ///
    /// # Errors
    ///
    /// Returns an error when the grid would be too large to represent.
    ///
    /// ```
    /// use pngify::PixelGrid;
    ///
    /// let grid = PixelGrid::rasterize(b"hello")?;
    /// assert_eq!("2x1", grid.dimensions().to_string());
    /// assert_eq!(b"hello\0\0\0", grid.derasterize());
    /// # Ok::<(), pngify::PixelGridError>(())
    /// ```
    pub fn rasterize(bytes: &[u8]) -> Result<Self, PixelGridError> {
        let dimensions = GridDimensions::for_byte_len(bytes.len())?;
        let sample_count = dimensions.sample_count()?;
        let mut samples = Vec::with_capacity(sample_count);
        samples.extend_from_slice(bytes);
        samples.resize(sample_count, FILLER);
        Ok(Self {
            dimensions,
            samples,
        })
    }

    /// Returns every sample in raster order, padding included.
    #[must_use]
    pub fn derasterize(&self) -> &[u8] {
        &self.samples
    }

    /// Returns grid dimensions.
    #[must_use]
    pub fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Returns one channel sample, or `None` outside the grid.
    #[must_use]
    pub fn sample(&self, row: u32, col: u32, channel: usize) -> Option<u8> {
        let index = self.dimensions.sample_index(row, col, channel)?;
        self.samples.get(index).copied()
    }

    /// Returns the RGBA samples of one pixel, or `None` outside the grid.
    #[must_use]
    pub fn pixel(&self, row: u32, col: u32) -> Option<[u8; CHANNELS]> {
        let start = self.dimensions.sample_index(row, col, 0)?;
        let run = self.samples.get(start..start + CHANNELS)?;
        let mut pixel = [FILLER; CHANNELS];
        pixel.copy_from_slice(run);
        Some(pixel)
    }

    /// Consumes the grid and returns the raw RGBA samples.
    #[must_use]
    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }
}

impl TryFrom<(GridDimensions, Vec<u8>)> for PixelGrid {
    type Error = PixelGridError;

    fn try_from(value: (GridDimensions, Vec<u8>)) -> Result<Self, Self::Error> {
        let (dimensions, samples) = value;
        let expected_len = dimensions.sample_count()?;
        let actual_len = samples.len();

        if actual_len != expected_len {
            return Err(PixelGridError::LengthMismatch {
                dimensions,
                expected_len,
                actual_len,
            });
        }

        Ok(Self {
            dimensions,
            samples,
        })
    }
}

fn ceil_sqrt(value: u64) -> u64 {
    let root = value.isqrt();
    if root * root == value { root } else { root + 1 }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::empty(0, 1, 1)]
    #[case::one_pixel(4, 1, 1)]
    #[case::two_pixels(5, 2, 1)]
    #[case::square(16, 2, 2)]
    #[case::one_past_square(17, 3, 2)]
    #[case::nine_pixels(36, 3, 3)]
    #[case::ten_pixels(37, 4, 3)]
    fn for_byte_len_picks_near_square_grid(
        #[case] byte_len: usize,
        #[case] width: u32,
        #[case] height: u32,
    ) {
        let dimensions =
            GridDimensions::for_byte_len(byte_len).expect("small byte counts should size");
        assert_eq!((width, height), (dimensions.width(), dimensions.height()));
    }

    #[test]
    fn for_byte_len_is_monotonic_and_large_enough() {
        let mut previous = GridDimensions::for_byte_len(0).expect("empty input should size");
        for byte_len in 1..4096 {
            let current =
                GridDimensions::for_byte_len(byte_len).expect("small byte counts should size");
            assert!(current.width() >= previous.width(), "width shrank at {byte_len}");
            assert!(current.height() >= previous.height(), "height shrank at {byte_len}");
            let capacity = current.sample_count().expect("small grids should count");
            assert!(capacity >= byte_len, "grid too small at {byte_len}");
            previous = current;
        }
    }

    #[test]
    fn new_rejects_zero_side() {
        assert_matches!(
            GridDimensions::new(0, 7),
            Err(PixelGridError::EmptyDimensions {
                width: 0,
                height: 7
            })
        );
    }

    #[test]
    fn rasterize_pads_with_filler() {
        let grid = PixelGrid::rasterize(&[0xAA; 9]).expect("nine bytes should rasterize");

        assert_eq!("2x2", grid.dimensions().to_string());
        let mut expected = vec![0xAA; 9];
        expected.extend_from_slice(&[FILLER; 7]);
        assert_eq!(expected.as_slice(), grid.derasterize());
    }

    #[test]
    fn sample_follows_raster_order() {
        let bytes: Vec<u8> = (0..24).collect();
        let grid = PixelGrid::rasterize(&bytes).expect("24 bytes should rasterize");
        let dimensions = grid.dimensions();

        for row in 0..dimensions.height() {
            for col in 0..dimensions.width() {
                for channel in 0..CHANNELS {
                    let index = dimensions
                        .sample_index(row, col, channel)
                        .expect("coordinate inside the grid");
                    assert_eq!(bytes.get(index).copied(), grid.sample(row, col, channel));
                }
            }
        }
        assert_eq!(Some([4, 5, 6, 7]), grid.pixel(0, 1));
        assert_eq!(None, grid.pixel(dimensions.height(), 0));
    }

    #[test]
    fn try_from_rejects_wrong_sample_count() {
        let dimensions = GridDimensions::new(2, 2).expect("2x2 should be valid");

        let result = PixelGrid::try_from((dimensions, vec![0x00_u8; 15]));

        assert_matches!(
            result,
            Err(PixelGridError::LengthMismatch {
                expected_len: 16,
                actual_len: 15,
                ..
            })
        );
    }
}
