use image::{DynamicImage, Rgba, RgbaImage};

use crate::catalog;
use crate::document::MetaPixelDocument;
use crate::error_codes::MetaPixelError;
use crate::meta_pixel::MetaPixel;

pub const GRID_WIDTH: u32 = 97;
pub const GRID_HEIGHT: u32 = 56;
/// The only column metapixels are read from and written to.
pub const META_COLUMN: u32 = GRID_WIDTH - 1;

const EMPTY_ROW: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Also blank the rows past the end of the document.
    pub clear_trailing_rows: bool,
}

/// Rows the loader discarded, in row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub cleared_rows: Vec<MetaPixelError>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.cleared_rows.is_empty()
    }
}

pub fn blank_grid() -> RgbaImage {
    RgbaImage::from_pixel(GRID_WIDTH, GRID_HEIGHT, EMPTY_ROW)
}

pub fn check_grid_shape(grid: &RgbaImage) -> Result<(), MetaPixelError> {
    if grid.width() != GRID_WIDTH || grid.height() != GRID_HEIGHT {
        return Err(MetaPixelError::GridShape {
            width: grid.width(),
            height: grid.height(),
        });
    }
    Ok(())
}

/// Accepts a decoded image only if it is already 8-bit RGBA of the hat size.
pub fn grid_from_image(image: DynamicImage) -> Result<RgbaImage, MetaPixelError> {
    match image {
        DynamicImage::ImageRgba8(grid) => {
            check_grid_shape(&grid)?;
            Ok(grid)
        }
        other => Err(MetaPixelError::MissingAlpha {
            color: format!("{:?}", other.color()),
        }),
    }
}

pub fn load(grid: &mut RgbaImage) -> Result<MetaPixelDocument, MetaPixelError> {
    load_with_report(grid).map(|(document, _)| document)
}

/// Decodes the reserved column row by row. Rows with an unknown id, or an id
/// already loaded from an earlier row, are blanked in `grid` and recorded in
/// the report instead of failing the load.
pub fn load_with_report(
    grid: &mut RgbaImage,
) -> Result<(MetaPixelDocument, LoadReport), MetaPixelError> {
    check_grid_shape(grid)?;

    let mut document = MetaPixelDocument::new();
    let mut report = LoadReport::default();
    for row in 0..GRID_HEIGHT {
        let Rgba([id, g, b, _]) = *grid.get_pixel(META_COLUMN, row);

        let anomaly = match catalog::lookup(id) {
            Some(_) if document.contains(id) => Some(MetaPixelError::DuplicateRow {
                id,
                row,
                first_row: document.position(id).unwrap_or_default() as u32,
            }),
            Some(kind) => {
                document.insert(MetaPixel::new(kind, g, b))?;
                None
            }
            None => Some(MetaPixelError::UnknownTypeId { id, row: Some(row) }),
        };

        if let Some(anomaly) = anomaly {
            // Id 0 is an unused row, not damage.
            if id != 0 {
                log::debug!("clearing row {row}: {anomaly}");
                report.cleared_rows.push(anomaly);
            }
            grid.put_pixel(META_COLUMN, row, EMPTY_ROW);
        }
    }

    if !report.is_clean() {
        log::info!(
            "loaded {} metapixels, cleared {} malformed rows",
            document.len(),
            report.cleared_rows.len()
        );
    }
    Ok((document, report))
}

/// Writes the document in order from row 0. Rows past the document are left
/// as they are.
pub fn save(document: &MetaPixelDocument, grid: &mut RgbaImage) -> Result<(), MetaPixelError> {
    save_with_options(document, grid, SaveOptions::default())
}

pub fn save_with_options(
    document: &MetaPixelDocument,
    grid: &mut RgbaImage,
    options: SaveOptions,
) -> Result<(), MetaPixelError> {
    check_grid_shape(grid)?;

    let mut rows = 0;
    for (row, pixel) in (0..GRID_HEIGHT).zip(document.iter()) {
        grid.put_pixel(META_COLUMN, row, pixel.get_rgba());
        rows += 1;
    }

    if options.clear_trailing_rows {
        for row in rows..GRID_HEIGHT {
            grid.put_pixel(META_COLUMN, row, EMPTY_ROW);
        }
    }
    log::debug!("saved {rows} metapixel rows");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::lookup;
    use crate::codec::Value;

    fn row(grid: &RgbaImage, row: u32) -> Rgba<u8> {
        *grid.get_pixel(META_COLUMN, row)
    }

    #[test]
    fn cape_offset_survives_save_and_load() {
        let mut document = MetaPixelDocument::new();
        document
            .add(lookup(10).expect("CapeOffset"))
            .expect("add should succeed")
            .set_colors(140, 120);
        assert_eq!(
            document.get(10).map(MetaPixel::get_value),
            Some(Value::Vec2(12, -8))
        );

        let mut grid = blank_grid();
        save(&document, &mut grid).expect("save should succeed");
        let loaded = load(&mut grid).expect("load should succeed");

        assert_eq!(loaded.ids(), &[10]);
        let cape = loaded.get(10).expect("cape should load");
        assert_eq!(cape.get_rgba(), Rgba([10, 140, 120, 255]));
    }

    #[test]
    fn unknown_rows_are_cleared_and_skipped() {
        let mut grid = blank_grid();
        grid.put_pixel(META_COLUMN, 0, Rgba([1, 130, 126, 255]));
        grid.put_pixel(META_COLUMN, 1, Rgba([255, 9, 9, 255]));

        let (document, report) = load_with_report(&mut grid).expect("load should succeed");
        assert_eq!(document.ids(), &[1]);
        assert_eq!(row(&grid, 1), Rgba([0, 0, 0, 0]));
        assert_eq!(row(&grid, 0), Rgba([1, 130, 126, 255]));
        assert_eq!(
            report.cleared_rows,
            vec![MetaPixelError::UnknownTypeId {
                id: 255,
                row: Some(1)
            }]
        );
    }

    #[test]
    fn duplicate_rows_keep_the_first_occurrence() {
        let mut grid = blank_grid();
        grid.put_pixel(META_COLUMN, 0, Rgba([34, 3, 0, 255]));
        grid.put_pixel(META_COLUMN, 1, Rgba([2, 0, 0, 255]));
        grid.put_pixel(META_COLUMN, 2, Rgba([34, 7, 0, 255]));

        let (document, report) = load_with_report(&mut grid).expect("load should succeed");
        assert_eq!(document.ids(), &[34, 2]);
        assert_eq!(document.get(34).map(MetaPixel::get_value), Some(Value::Int(3)));
        assert_eq!(row(&grid, 2), Rgba([0, 0, 0, 0]));
        assert!(report.cleared_rows.iter().all(MetaPixelError::is_recoverable));
        assert_eq!(report.cleared_rows.len(), 1);
    }

    #[test]
    fn rows_after_a_gap_still_load() {
        let mut grid = blank_grid();
        grid.put_pixel(META_COLUMN, 5, Rgba([70, 0, 0, 255]));
        let (document, report) = load_with_report(&mut grid).expect("load should succeed");
        assert_eq!(document.ids(), &[70]);
        assert!(report.is_clean());
    }

    #[test]
    fn other_columns_are_untouched() {
        let mut grid = blank_grid();
        grid.put_pixel(0, 1, Rgba([255, 9, 9, 255]));
        grid.put_pixel(META_COLUMN, 1, Rgba([255, 9, 9, 255]));
        load(&mut grid).expect("load should succeed");
        assert_eq!(*grid.get_pixel(0, 1), Rgba([255, 9, 9, 255]));
    }

    #[test]
    fn save_leaves_trailing_rows_unless_asked() {
        let mut grid = blank_grid();
        grid.put_pixel(META_COLUMN, 0, Rgba([1, 128, 128, 255]));
        grid.put_pixel(META_COLUMN, 1, Rgba([2, 0, 0, 255]));

        let mut document = load(&mut grid.clone()).expect("load should succeed");
        document.remove(1);

        let mut kept = grid.clone();
        save(&document, &mut kept).expect("save should succeed");
        assert_eq!(row(&kept, 0), Rgba([2, 0, 0, 255]));
        assert_eq!(row(&kept, 1), Rgba([2, 0, 0, 255]));

        let mut cleared = grid.clone();
        save_with_options(
            &document,
            &mut cleared,
            SaveOptions {
                clear_trailing_rows: true,
            },
        )
        .expect("save should succeed");
        assert_eq!(row(&cleared, 0), Rgba([2, 0, 0, 255]));
        assert_eq!(row(&cleared, 1), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn wrong_shape_is_rejected_by_load_and_save() {
        let mut small = RgbaImage::new(32, 32);
        assert_eq!(
            load(&mut small).expect_err("load should fail"),
            MetaPixelError::GridShape {
                width: 32,
                height: 32
            }
        );
        assert!(save(&MetaPixelDocument::new(), &mut small).is_err());
    }

    #[test]
    fn non_rgba_images_are_rejected() {
        let rgb = DynamicImage::new_rgb8(GRID_WIDTH, GRID_HEIGHT);
        let error = grid_from_image(rgb).expect_err("rgb should fail");
        assert_eq!(error.code(), "GRID_NOT_RGBA");

        let rgba = DynamicImage::new_rgba8(GRID_WIDTH, GRID_HEIGHT);
        assert!(grid_from_image(rgba).is_ok());

        let wrong = DynamicImage::new_rgba8(96, 56);
        assert_eq!(
            grid_from_image(wrong).expect_err("size should fail").code(),
            "GRID_SHAPE"
        );
    }
}
