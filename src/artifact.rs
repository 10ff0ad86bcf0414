use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;
use tracing::instrument;

use crate::codec::{Decoded, Decoder, Encoder, GridDimensions, PixelGrid, PixelGridError};
use crate::error::PngifyError;

/// Errors returned when converting between pixel grids and image files.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The source bytes are not a supported image format.
    #[error("failed to detect image format from source bytes")]
    UnknownFormat(#[source] image::ImageError),
    /// The source image failed to decode.
    #[error("failed to decode source image")]
    Decode(#[source] image::ImageError),
    /// The grid could not be written as PNG.
    #[error("failed to encode pixel grid as PNG")]
    Encode(#[source] image::ImageError),
    /// Reading or writing the image file failed.
    #[error("failed to access image file `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The decoded image does not form a valid grid.
    #[error(transparent)]
    Grid(#[from] PixelGridError),
}

/// Image-file side of the codec: PNG in, PNG out.
pub struct ImageArtifact;

impl ImageArtifact {
    /// Encodes a grid as a lossless RGBA8 PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the PNG encoder rejects the grid.
    pub fn encode_png(grid: &PixelGrid) -> Result<Vec<u8>, ArtifactError> {
        let dimensions = grid.dimensions();
        let mut png_bytes = Vec::new();
        PngEncoder::new(&mut png_bytes)
            .write_image(
                grid.derasterize(),
                dimensions.width(),
                dimensions.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(ArtifactError::Encode)?;
        Ok(png_bytes)
    }

    /// Decodes any supported image into an RGBA8 grid.
    ///
    /// Images that were not produced by this crate still decode here; the
    /// codec rejects them afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error when format detection or decoding fails.
    pub fn decode_grid(source_bytes: &[u8]) -> Result<PixelGrid, ArtifactError> {
        let source_format =
            image::guess_format(source_bytes).map_err(ArtifactError::UnknownFormat)?;
        let decoded = image::load_from_memory_with_format(source_bytes, source_format)
            .map_err(ArtifactError::Decode)?
            .to_rgba8();
        let dimensions = GridDimensions::new(decoded.width(), decoded.height())?;
        Ok(PixelGrid::try_from((dimensions, decoded.into_raw()))?)
    }

    /// Writes a grid to `path` as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the file write fails.
    #[instrument(skip(grid), level = "debug", fields(dimensions = %grid.dimensions()))]
    pub fn write_png(grid: &PixelGrid, path: &Path) -> Result<(), ArtifactError> {
        let png_bytes = Self::encode_png(grid)?;
        std::fs::write(path, png_bytes).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads an image file into a grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    #[instrument(level = "debug")]
    pub fn read_grid(path: &Path) -> Result<PixelGrid, ArtifactError> {
        let source_bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode_grid(&source_bytes)
    }

    /// Finalizes an encode session straight to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns a codec error for oversized input or an artifact error if PNG
    /// encoding fails.
    ///
    /// ```
    /// use pngify::{Encoder, ImageArtifact};
    ///
    /// let png = ImageArtifact::encode(Encoder::begin("hello"))?;
    /// let decoded = ImageArtifact::decode(&png)?;
    /// assert_eq!(b"hello", decoded.payload());
    /// # Ok::<(), pngify::PngifyError>(())
    /// ```
    pub fn encode(encoder: Encoder) -> Result<Vec<u8>, PngifyError> {
        let grid = encoder.finalize()?;
        Ok(Self::encode_png(&grid)?)
    }

    /// Decodes image bytes and the frame they carry.
    ///
    /// # Errors
    ///
    /// Returns an artifact error for undecodable images or a codec error for
    /// images that do not carry a valid frame.
    pub fn decode(source_bytes: &[u8]) -> Result<Decoded, PngifyError> {
        let grid = Self::decode_grid(source_bytes)?;
        Ok(Decoder::decode(&grid)?)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use image::RgbImage;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::CodecErrorKind;

    #[test]
    fn png_round_trip_preserves_every_sample() {
        let bytes: Vec<u8> = (0..=255).collect();
        let grid = PixelGrid::rasterize(&bytes).expect("256 bytes should rasterize");

        let png_bytes = ImageArtifact::encode_png(&grid).expect("grid should encode");
        let restored = ImageArtifact::decode_grid(&png_bytes).expect("png should decode");

        assert_eq!(grid, restored);
    }

    #[test]
    fn encode_writes_png_signature() {
        let png_bytes =
            ImageArtifact::encode(Encoder::begin("hello")).expect("text payload should encode");

        assert_eq!(
            image::ImageFormat::Png,
            image::guess_format(&png_bytes).expect("png signature should be detected")
        );
    }

    #[test]
    fn decode_grid_rejects_non_image_bytes() {
        let result = ImageArtifact::decode_grid(b"definitely not an image");
        assert_matches!(result, Err(ArtifactError::UnknownFormat(_)));
    }

    #[test]
    fn decode_rejects_rgb_photo_without_frame() -> Result<(), Box<dyn std::error::Error>> {
        let photo = RgbImage::from_fn(8, 8, |x, y| {
            image::Rgb([(x * 31) as u8, (y * 17) as u8, 0x80])
        });
        let mut png_bytes = Vec::new();
        PngEncoder::new(&mut png_bytes).write_image(
            photo.as_raw(),
            8,
            8,
            ExtendedColorType::Rgb8,
        )?;

        let result = ImageArtifact::decode(&png_bytes);

        assert_matches!(
            result,
            Err(PngifyError::Codec(error)) if error.kind() == CodecErrorKind::Format
        );
        Ok(())
    }

    #[test]
    fn read_grid_reports_missing_file() {
        let path = Path::new("/nonexistent/pngify/missing.png");

        assert_matches!(
            ImageArtifact::read_grid(path),
            Err(ArtifactError::Io { path: reported, .. }) if reported == path
        );
    }

    #[test]
    fn write_then_read_grid_from_disk() {
        let grid = PixelGrid::rasterize(b"on disk").expect("short input should rasterize");
        let path = std::env::temp_dir().join(format!(
            "pngify-artifact-{}-{:?}.png",
            std::process::id(),
            std::thread::current().id()
        ));

        ImageArtifact::write_png(&grid, &path).expect("temp dir should be writable");
        let restored = ImageArtifact::read_grid(&path).expect("written png should read back");
        let _ = std::fs::remove_file(&path);

        assert_eq!(grid, restored);
    }
}
