//! Chicago Loop departure board.
//!
//! Pulls CTA 'L' arrivals, Metra Electric departures (GTFS-realtime), CTA bus
//! predictions and the current temperature, then serves them as a web page
//! and as a 32x32 indexed-color LED board.

pub mod aggregate;
pub mod bitmap;
pub mod board;
pub mod bus;
pub mod clock;
pub mod commuter_rail;
pub mod config;
pub mod console;
pub mod error;
pub mod font;
pub mod models;
pub mod palette;
pub mod rail;
pub mod server;
pub mod upstream;
pub mod weather;

pub use bitmap::{Pixel, PixelGrid};
pub use board::{Board, BoardSnapshot, WebSnapshot};
pub use error::{BoardError, Result};
pub use models::{Arrival, Source};
