//! Turning a finished [`QrCode`] into something a person can scan: grayscale images,
//! SVG markup and terminal text.

use image::{GrayImage, Luma};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::qrcode::QrCode;

/// Configuration for raster output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Quiet zone width in modules (default: 4)
    pub border: u32,
    /// Approximate image width in pixels; the module scale is the largest integer that
    /// stays within it, but never below 1 (default: 260)
    pub target_size: u32,
    /// Luma of dark modules (default: 0)
    pub dark: u8,
    /// Luma of light modules and the quiet zone (default: 255)
    pub light: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            border: 4,
            target_size: 260,
            dark: 0,
            light: 255,
        }
    }
}

impl RenderConfig {
    /// Pixels per module for a symbol of the given size.
    pub fn scale_for(&self, qr_size: usize) -> u32 {
        let modules = qr_size as u32 + self.border * 2;
        (self.target_size / modules).max(1)
    }
}

/// Rasterizes the symbol with its quiet zone into a grayscale image.
pub fn to_image(qr: &QrCode, config: &RenderConfig) -> GrayImage {
    let scale = config.scale_for(qr.size());
    let border = config.border as i32;
    let side = (qr.size() as u32 + config.border * 2) * scale;
    GrayImage::from_fn(side, side, |x, y| {
        let qr_x = (x / scale) as i32 - border;
        let qr_y = (y / scale) as i32 - border;
        if qr.get_module(qr_x, qr_y) {
            Luma([config.dark])
        } else {
            Luma([config.light])
        }
    })
}

/// Renders the symbol and writes it as a PNG, creating parent directories as needed.
pub fn save_png<P: AsRef<Path>>(qr: &QrCode, path: P, config: &RenderConfig) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    to_image(qr, config).save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Returns SVG markup depicting the symbol with `border` light modules on each side.
/// The string always uses Unix newlines.
pub fn to_svg_string(qr: &QrCode, border: u32) -> String {
    let border = border as usize;
    let dimension = qr.size() + border * 2;
    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"0 0 {0} {0}\" stroke=\"none\">\n",
        dimension
    );
    result += "\t<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\n";
    let path: Vec<String> = qr
        .rows()
        .enumerate()
        .flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &dark)| dark)
                .map(move |(x, _)| format!("M{},{}h1v1h-1z", x + border, y + border))
        })
        .collect();
    result += &format!("\t<path d=\"{}\" fill=\"#000000\"/>\n", path.join(" "));
    result += "</svg>\n";
    result
}

/// Returns the symbol as text, two characters per module so it looks square in a
/// terminal.
pub fn to_ascii(qr: &QrCode, border: u32) -> String {
    let border = border as i32;
    let size = qr.size() as i32;
    let mut result = String::new();
    for y in -border..size + border {
        for x in -border..size + border {
            result += if qr.get_module(x, y) { "██" } else { "  " };
        }
        result.push('\n');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::EcLevel;

    fn hello() -> QrCode {
        QrCode::encode_text("Hello, world!", EcLevel::Low).unwrap()
    }

    #[test]
    fn test_to_svg_string() {
        let svg = to_svg_string(&hello(), 4);
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains("viewBox=\"0 0 29 29\""));
        // Top-left finder corner sits just inside the border
        assert!(svg.contains("M4,4h1v1h-1z"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_to_image_dimensions() {
        let qr = hello();
        let config = RenderConfig::default();
        // 21 + 8 = 29 modules, 260 / 29 = 8 px each
        assert_eq!(config.scale_for(qr.size()), 8);
        let img = to_image(&qr, &config);
        assert_eq!(img.dimensions(), (232, 232));
        assert_eq!(img.get_pixel(0, 0), &Luma([255]));
        assert_eq!(img.get_pixel(4 * 8, 4 * 8), &Luma([0]));
    }

    #[test]
    fn test_to_image_minimum_scale() {
        let qr = hello();
        let config = RenderConfig {
            border: 0,
            target_size: 1,
            ..Default::default()
        };
        assert_eq!(to_image(&qr, &config).dimensions(), (21, 21));
    }

    #[test]
    fn test_to_ascii() {
        let qr = hello();
        let text = to_ascii(&qr, 1);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 23);
        assert!(lines[0].chars().all(|c| c == ' '));
        assert!(lines[1].starts_with("  ██████████████"));
    }
}
