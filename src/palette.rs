// Display colors for the indexed board, as a panel driver or the LED page sees them.

use crate::bitmap::{Pixel, PixelGrid};

pub type Rgb = (u8, u8, u8);

pub const DIM: Rgb = (40, 40, 40);
pub const AMBER: Rgb = (255, 157, 0);
pub const GREEN: Rgb = (0, 255, 0);

pub fn rgb(pixel: Pixel) -> Rgb {
    match pixel {
        Pixel::Off => DIM,
        Pixel::Primary => AMBER,
        Pixel::Highlight => GREEN,
    }
}

pub fn hex(pixel: Pixel) -> String {
    let (r, g, b) = rgb(pixel);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

impl PixelGrid {
    /// Frame in panel order (row by row) ready for a `SetPixel` style sink.
    pub fn to_rgb_rows(&self) -> Vec<Vec<Rgb>> {
        self.rows()
            .iter()
            .map(|row| row.iter().map(|&p| rgb(p)).collect())
            .collect()
    }
}
