// standard library
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// crate modules
use crate::error::{Error, Result};

// gridkit modules
use gridkit_utils::f;

// external crates
use log::debug;

/// Pixel storage of a [Raster]
#[derive(Debug, Clone, PartialEq)]
pub enum Pixels {
    /// One palette index per pixel with a palette of 256 RGB colours
    Indexed {
        palette: Vec<[u8; 3]>,
        indices: Vec<u8>,
    },
    /// Three 8-bit channels per pixel
    Rgb(Vec<u8>),
}

/// Finished pixel grid
///
/// Rows are stored top to bottom, so output row 0 is the first row written to
/// any image file.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub pixels: Pixels,
}

impl Raster {
    /// Check the pixel buffer matches the raster extents
    pub fn new(width: usize, height: usize, pixels: Pixels) -> Result<Self> {
        let expected = width * height;
        let (found, palette) = match &pixels {
            Pixels::Indexed { palette, indices } => (indices.len(), palette.len()),
            Pixels::Rgb(channels) => (channels.len() / 3, 256),
        };
        let partial = matches!(&pixels, Pixels::Rgb(c) if c.len() % 3 != 0);

        if found != expected || partial || palette > 256 || palette == 0 {
            return Err(Error::InvalidOptions(f!(
                "{found} pixels for a {width}x{height} raster"
            )));
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// True for palette rasters
    pub fn is_indexed(&self) -> bool {
        matches!(self.pixels, Pixels::Indexed { .. })
    }

    /// RGB colour of the pixel at `row`, `column`
    pub fn rgb(&self, row: usize, column: usize) -> Option<[u8; 3]> {
        if row >= self.height || column >= self.width {
            return None;
        }

        let i = row * self.width + column;
        match &self.pixels {
            Pixels::Indexed { palette, indices } => palette.get(indices[i] as usize).copied(),
            Pixels::Rgb(channels) => {
                Some([channels[3 * i], channels[3 * i + 1], channels[3 * i + 2]])
            }
        }
    }
}

/// Write a raster to a PNG file
///
/// Indexed rasters become palette images, anything else an 8-bit RGB image.
/// Rows are written top to bottom.
pub fn write_png<P: AsRef<Path>>(raster: &Raster, path: P) -> Result<()> {
    let path = path.as_ref();
    debug!(
        "Writing {}x{} raster to {}",
        raster.width,
        raster.height,
        path.display()
    );

    let mut writer = BufWriter::new(File::create(path)?);
    encode_png(raster, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Encode a raster as PNG into any writer
pub fn encode_png<W: Write>(raster: &Raster, writer: W) -> Result<()> {
    let width = u32::try_from(raster.width)
        .map_err(|_| Error::InvalidOptions("raster too wide for png".to_string()))?;
    let height = u32::try_from(raster.height)
        .map_err(|_| Error::InvalidOptions("raster too tall for png".to_string()))?;

    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_depth(png::BitDepth::Eight);

    let data = match &raster.pixels {
        Pixels::Indexed { palette, indices } => {
            encoder.set_color(png::ColorType::Indexed);
            encoder.set_palette(palette.concat());
            indices
        }
        Pixels::Rgb(channels) => {
            encoder.set_color(png::ColorType::Rgb);
            channels
        }
    };

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(data)?;
    png_writer.finish()?;
    Ok(())
}
