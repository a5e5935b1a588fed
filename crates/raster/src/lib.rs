use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba};
use planscale_core::ImageFrame;
use std::fs;
use std::path::{Path, PathBuf};

pub mod export;
pub mod font;

pub use export::{footer_text, render_labelled, save_labelled, LabelledExport};

pub type RgbaImage = image::ImageBuffer<Rgba<u8>, Vec<u8>>;

#[derive(Debug, Clone)]
pub enum OpenSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl From<PathBuf> for OpenSource {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Path> for OpenSource {
    fn from(value: &Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

impl From<Vec<u8>> for OpenSource {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("unsupported image format for {0}")]
    UnsupportedFormat(PathBuf),
    #[error("image has no pixels")]
    EmptyImage,
    #[error("no image loaded")]
    NoImage,
}

/// A decoded image kept at its original resolution
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pixels: RgbaImage,
}

impl LoadedImage {
    pub fn from_pixels(pixels: RgbaImage) -> Result<Self, RasterError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(RasterError::EmptyImage);
        }
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Frame for a session, fitted to `viewport`
    pub fn frame(&self, viewport: Option<(u32, u32)>) -> ImageFrame {
        ImageFrame::fit(self.width(), self.height(), viewport)
    }
}

pub trait ImageSource {
    fn open(&self, source: OpenSource) -> Result<LoadedImage, RasterError>;
    fn resize(&self, image: &LoadedImage, width: u32, height: u32) -> RgbaImage;
}

/// Decodes with the `image` crate and resamples with Lanczos3
#[derive(Debug, Clone, Copy)]
pub struct DecodingSource {
    filter: FilterType,
}

impl Default for DecodingSource {
    fn default() -> Self {
        Self { filter: FilterType::Lanczos3 }
    }
}

impl DecodingSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageSource for DecodingSource {
    fn open(&self, source: OpenSource) -> Result<LoadedImage, RasterError> {
        let decoded = match source {
            OpenSource::Path(path) => {
                let bytes = fs::read(&path)?;
                let format = ImageFormat::from_path(&path)
                    .or_else(|_| image::guess_format(&bytes))
                    .map_err(|_| RasterError::UnsupportedFormat(path.clone()))?;
                image::load_from_memory_with_format(&bytes, format)?
            }
            OpenSource::Bytes(bytes) => image::load_from_memory(&bytes)?,
        };

        let image = LoadedImage::from_pixels(decoded.to_rgba8())?;
        log::debug!("decoded {}x{} image", image.width(), image.height());
        Ok(image)
    }

    fn resize(&self, image: &LoadedImage, width: u32, height: u32) -> RgbaImage {
        let (width, height) = (width.max(1), height.max(1));
        if image.dimensions() == (width, height) {
            return image.pixels.clone();
        }
        image::imageops::resize(&image.pixels, width, height, self.filter)
    }
}

/// Encode `image` to `path`, picking the format from the extension
///
/// Alpha is dropped so formats without an alpha channel accept the output.
pub fn save_image(image: &RgbaImage, path: &Path) -> Result<(), RasterError> {
    let format =
        ImageFormat::from_path(path).map_err(|_| RasterError::UnsupportedFormat(path.to_path_buf()))?;
    DynamicImage::ImageRgba8(image.clone()).to_rgb8().save_with_format(path, format)?;
    Ok(())
}

pub fn default_source() -> DecodingSource {
    DecodingSource::new()
}
