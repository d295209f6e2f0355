// Terminal stand-in for the LED panel.

use log::info;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use crate::bitmap::{GRID_SIZE, Pixel, PixelGrid};
use crate::board::Board;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

pub fn pixel_char(pixel: Pixel) -> char {
    match pixel {
        Pixel::Off => '·',
        Pixel::Primary => '█',
        Pixel::Highlight => '▓',
    }
}

pub fn format_grid(grid: &PixelGrid) -> String {
    let mut out = String::with_capacity(GRID_SIZE * (GRID_SIZE + 1) * 3);
    for row in grid.rows() {
        out.extend(row.iter().map(|&p| pixel_char(p)));
        out.push('\n');
    }
    out
}

/// Draw a frame every `interval` until interrupted, or once.
pub fn run(board: &Board, interval: Duration, once: bool) -> io::Result<()> {
    info!("Starting LED transit board in console mode (refresh every {}s)", interval.as_secs());

    loop {
        let grid = board.led_grid();

        let mut stdout = io::stdout().lock();
        if !once {
            write!(stdout, "{}", CLEAR_SCREEN)?;
        }
        writeln!(stdout, "{}", format_grid(&grid))?;
        stdout.flush()?;
        drop(stdout);

        if once {
            return Ok(());
        }
        thread::sleep(interval);
    }
}
