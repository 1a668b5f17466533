// Photo preview rendering for the terminal

use crate::domain::Item;
use crate::error::{Result, TriageError};
use image::{DynamicImage, GenericImageView, Pixel};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use std::path::Path;

/// Maximum preview width in terminal columns
pub const MAX_IMAGE_WIDTH: u32 = 160;
/// Maximum preview height in pixels (two pixels per terminal row)
pub const MAX_IMAGE_HEIGHT: u32 = 100;

/// A photo rendered to styled terminal lines
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoPreview {
    /// Pixel dimensions of the source image
    pub dimensions: (u32, u32),
    pub lines: Vec<Line<'static>>,
}

/// Loads an image from disk
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|e| match e {
        image::ImageError::IoError(io) => TriageError::from(io),
        other => TriageError::IoFailure(format!("Image loading error: {}", other)),
    })
}

/// Calculates new dimensions to fit image within max width and height while preserving aspect ratio
pub fn calculate_resize_dimensions(
    original_width: u32,
    original_height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    if original_width == 0 || original_height == 0 {
        return (0, 0);
    }

    let width_ratio = max_width as f64 / original_width as f64;
    let height_ratio = max_height as f64 / original_height as f64;
    let ratio = width_ratio.min(height_ratio);

    if ratio >= 1.0 {
        // Never upscale
        (original_width, original_height)
    } else {
        let new_width = ((original_width as f64 * ratio) as u32).max(1);
        let new_height = ((original_height as f64 * ratio) as u32).max(1);
        (new_width, new_height)
    }
}

/// Converts an image to styled lines using half-block characters.
///
/// Each cell is an upper half block (▀) whose foreground is the upper pixel
/// and background the lower one, so one terminal row shows two pixel rows.
pub fn image_to_halfblock_lines(img: &DynamicImage, width: u32, height: u32) -> Vec<Line<'static>> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let height = if height.is_multiple_of(2) {
        height
    } else {
        height + 1
    };

    // Triangle keeps large camera images fast enough to resize
    let img = img
        .resize_exact(width, height, image::imageops::FilterType::Triangle)
        .to_rgb8();

    (0..height / 2)
        .map(|row| {
            let upper_y = row * 2;
            let lower_y = upper_y + 1;
            let spans: Vec<Span<'static>> = (0..width)
                .map(|x| {
                    let upper = img.get_pixel(x, upper_y).to_rgb();
                    let lower = img.get_pixel(x, lower_y).to_rgb();
                    let style = Style::default()
                        .fg(Color::Rgb(upper[0], upper[1], upper[2]))
                        .bg(Color::Rgb(lower[0], lower[1], lower[2]));
                    Span::styled("▀", style)
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Renders a photo preview bounded by the given pixel box.
pub fn generate_photo_preview(item: &Item, max_width: u32, max_height: u32) -> Result<PhotoPreview> {
    let img = load_image(&item.locator)?;
    let (original_width, original_height) = img.dimensions();
    let (new_width, new_height) =
        calculate_resize_dimensions(original_width, original_height, max_width, max_height);

    let info_style = Style::default().fg(Color::Gray);
    let mut lines: Vec<Line<'static>> = vec![
        Line::from(vec![
            Span::styled(
                format!("{}×{} px", original_width, original_height),
                info_style.add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                item.sort_key
                    .map(|taken| taken.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "date unknown".to_string()),
                info_style,
            ),
        ]),
        Line::from(""),
    ];
    lines.extend(image_to_halfblock_lines(&img, new_width, new_height));

    Ok(PhotoPreview {
        dimensions: (original_width, original_height),
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_photo(dir: &TempDir, name: &str, width: u32, height: u32) -> Item {
        let path = dir.path().join(name);
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            let intensity = ((x + y) * 255 / (width + height)) as u8;
            image::Rgb([intensity, intensity, intensity])
        });
        img.save(&path).unwrap();
        Item::new(1, path, None)
    }

    #[test]
    fn test_calculate_resize_dimensions_scale_down() {
        let (width, height) = calculate_resize_dimensions(1600, 1200, 80, 40);
        assert!(width <= 80);
        assert!(height <= 40);
        // 4:3 within rounding
        let ratio_diff = (width * 3).abs_diff(height * 4);
        assert!(ratio_diff <= 4, "Aspect ratio not preserved: {}x{}", width, height);
    }

    #[test]
    fn test_calculate_resize_dimensions_no_upscale() {
        assert_eq!(calculate_resize_dimensions(40, 30, 80, 40), (40, 30));
    }

    #[test]
    fn test_calculate_resize_dimensions_zero() {
        assert_eq!(calculate_resize_dimensions(0, 0, 80, 40), (0, 0));
    }

    #[test]
    fn test_calculate_resize_dimensions_extreme_panorama() {
        // Never collapses to a zero-height image
        let (width, height) = calculate_resize_dimensions(10_000, 10, 80, 40);
        assert_eq!(width, 80);
        assert_eq!(height, 1);
    }

    #[test]
    fn test_image_to_halfblock_dimensions() {
        let img = DynamicImage::new_rgb8(10, 10);
        let lines = image_to_halfblock_lines(&img, 5, 6);

        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_eq!(line.spans.len(), 5);
        }
    }

    #[test]
    fn test_image_to_halfblock_odd_height_rounds_up() {
        let img = DynamicImage::new_rgb8(4, 4);
        assert_eq!(image_to_halfblock_lines(&img, 4, 3).len(), 2);
        assert!(image_to_halfblock_lines(&img, 0, 3).is_empty());
    }

    #[test]
    fn test_load_image_png() {
        let temp_dir = TempDir::new().unwrap();
        let item = write_photo(&temp_dir, "test.png", 10, 10);
        assert_eq!(load_image(&item.locator).unwrap().dimensions(), (10, 10));
    }

    #[test]
    fn test_load_image_nonexistent_is_io_failure() {
        let result = load_image(Path::new("/nonexistent/image.png"));
        assert!(matches!(result, Err(TriageError::IoFailure(_))));
    }

    #[test]
    fn test_load_image_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.jpg");
        std::fs::write(&path, b"not a jpeg").unwrap();
        assert!(load_image(&path).is_err());
    }

    #[test]
    fn test_generate_photo_preview() {
        let temp_dir = TempDir::new().unwrap();
        let item = write_photo(&temp_dir, "photo.png", 100, 50);

        let preview = generate_photo_preview(&item, 40, 40).unwrap();
        assert_eq!(preview.dimensions, (100, 50));

        let header: String = preview.lines[0]
            .spans
            .iter()
            .map(|s| s.content.to_string())
            .collect();
        assert!(header.contains("100×50 px"));
        assert!(header.contains("date unknown"));

        // Two header lines plus 20 pixel rows rendered as 10 terminal rows
        assert_eq!(preview.lines.len(), 2 + 10);
        assert_eq!(preview.lines[2].spans.len(), 40);
    }
}
