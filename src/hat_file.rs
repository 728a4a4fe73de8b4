use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use image::{ImageFormat, ImageReader, RgbaImage};

use crate::document::MetaPixelDocument;
use crate::persistence::{grid_from_image, load_with_report, save_with_options, LoadReport, SaveOptions};

/// A hat image opened for editing: the full pixel grid plus the metapixels
/// decoded from its reserved column.
#[derive(Debug, Clone)]
pub struct HatSession {
    pub grid: RgbaImage,
    pub document: MetaPixelDocument,
    pub report: LoadReport,
}

impl HatSession {
    pub fn save_to(&mut self, path: &Path, options: SaveOptions) -> Result<()> {
        save_with_options(&self.document, &mut self.grid, options)
            .with_context(|| format!("failed to write metapixels for {}", path.display()))?;
        write_hat(path, &self.grid)
    }
}

pub fn read_hat(path: &Path) -> Result<RgbaImage> {
    // Content alone decides the format; the extension is ignored.
    let file = File::open(path).with_context(|| format!("failed to open hat {}", path.display()))?;
    let reader = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .with_context(|| format!("failed to read hat {}", path.display()))?;

    match reader.format() {
        Some(ImageFormat::Png) => {}
        Some(other) => bail!(
            "can't open {}: expected a PNG file, found {:?}",
            path.display(),
            other
        ),
        None => bail!(
            "can't open {}: wasn't able to identify file as image",
            path.display()
        ),
    }

    let image = reader
        .decode()
        .with_context(|| format!("failed to decode hat {}", path.display()))?;
    let grid =
        grid_from_image(image).with_context(|| format!("can't open {}", path.display()))?;
    Ok(grid)
}

pub fn write_hat(path: &Path, grid: &RgbaImage) -> Result<()> {
    grid.save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("failed to write hat {}", path.display()))
}

pub fn open_hat(path: &Path) -> Result<HatSession> {
    let mut grid = read_hat(path)?;
    let (document, report) =
        load_with_report(&mut grid).with_context(|| format!("failed to load {}", path.display()))?;
    log::debug!(
        "opened {} with {} metapixels",
        path.display(),
        document.len()
    );
    Ok(HatSession {
        grid,
        document,
        report,
    })
}
