// 32x32 indexed-color board: the pixel grid, text drawing and the fixed dashboard layout.
//
//  y=1   DAY            M/D
//  y=8   TEMP          H:MM
//  y=14  ----------------------
//  y=17  ME     t1  .  t2
//  y=24  ----------------------
//  y=27  #2     t1  .  t2

use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};

use crate::font::{self, GLYPH_SPACING};
use crate::models::Arrival;

pub const GRID_SIZE: usize = 32;

const DAY_NAMES: [&str; 7] = ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

const MARGIN: i32 = 1;
const TOP_ROW: i32 = 1;
const DATE_MIN_X: i32 = 17;
const MIDDLE_ROW: i32 = 8;
const CLOCK_MIN_X: i32 = 15;
const DIVIDER_ROWS: [usize; 2] = [14, 24];
const COMMUTER_ROW: i32 = 17;
const BUS_ROW: i32 = 27;
const FIRST_TIME_X: i32 = 12;
const SECOND_TIME_X: i32 = 24;
const SEPARATOR_X: i32 = 21;
const SEPARATOR_DY: i32 = 2;
const PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Pixel {
    #[default]
    Off = 0,
    Primary = 1,
    Highlight = 2,
}

impl Pixel {
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl Serialize for Pixel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

/// Row-major grid, `cells[y][x]`, origin top-left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PixelGrid {
    cells: [[Pixel; GRID_SIZE]; GRID_SIZE],
}

impl Default for PixelGrid {
    fn default() -> Self {
        PixelGrid {
            cells: [[Pixel::Off; GRID_SIZE]; GRID_SIZE],
        }
    }
}

impl PixelGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Pixel> {
        let (x, y) = Self::index(x, y)?;
        Some(self.cells[y][x])
    }

    /// Write one cell. Cells outside the grid are ignored; returns whether
    /// anything was written.
    pub fn set(&mut self, x: i32, y: i32, color: Pixel) -> bool {
        match Self::index(x, y) {
            Some((x, y)) => {
                self.cells[y][x] = color;
                true
            }
            None => false,
        }
    }

    pub fn rows(&self) -> &[[Pixel; GRID_SIZE]; GRID_SIZE] {
        &self.cells
    }

    pub fn count(&self, color: Pixel) -> usize {
        self.cells.iter().flatten().filter(|&&p| p == color).count()
    }

    pub fn fill_row(&mut self, y: usize, color: Pixel) {
        if let Some(row) = self.cells.get_mut(y) {
            row.fill(color);
        }
    }

    /// Draw `text` with its top-left at (x, y). Unknown characters are
    /// skipped without advancing; bits falling off the grid are clipped.
    /// Returns the cursor column after the last glyph.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, color: Pixel) -> i32 {
        let mut cursor = x;

        for g in text.chars().filter_map(font::glyph) {
            for (col, row) in g.lit() {
                self.set(cursor + col as i32, y + row as i32, color);
            }
            cursor += (g.width + GLYPH_SPACING) as i32;
        }

        cursor
    }

    fn index(x: i32, y: i32) -> Option<(usize, usize)> {
        let size = GRID_SIZE as i32;
        if (0..size).contains(&x) && (0..size).contains(&y) {
            Some((x as usize, y as usize))
        } else {
            None
        }
    }
}

/// Everything one render needs. Arrival slices are expected soonest-first;
/// only the first two of each are drawn.
#[derive(Debug, Clone)]
pub struct BoardFrame<'a> {
    pub now: DateTime<Tz>,
    pub temperature: Option<i32>,
    pub commuter_label: &'a str,
    pub commuter: &'a [Arrival],
    pub bus_label: &'a str,
    pub bus: &'a [Arrival],
}

pub fn render_board(frame: &BoardFrame<'_>) -> PixelGrid {
    let mut grid = PixelGrid::new();
    let now = frame.now;

    let day = DAY_NAMES[now.weekday().num_days_from_monday() as usize];
    grid.draw_text(day, MARGIN, TOP_ROW, Pixel::Primary);

    let date = format!("{}/{}", now.month(), now.day());
    grid.draw_text(&date, right_aligned(&date, DATE_MIN_X), TOP_ROW, Pixel::Primary);

    if let Some(temperature) = frame.temperature {
        grid.draw_text(&format!("{}F", temperature), MARGIN, MIDDLE_ROW, Pixel::Primary);
    }

    let time = format!("{}:{:02}", now.hour12().1, now.minute());
    grid.draw_text(&time, right_aligned(&time, CLOCK_MIN_X), MIDDLE_ROW, Pixel::Primary);

    for y in DIVIDER_ROWS {
        grid.fill_row(y, Pixel::Primary);
    }

    draw_arrival_row(&mut grid, COMMUTER_ROW, frame.commuter_label, frame.commuter);
    draw_arrival_row(&mut grid, BUS_ROW, frame.bus_label, frame.bus);

    grid
}

fn draw_arrival_row(grid: &mut PixelGrid, y: i32, label: &str, arrivals: &[Arrival]) {
    grid.draw_text(label, MARGIN, y, Pixel::Primary);

    let (text, color) = time_cell(arrivals.first());
    grid.draw_text(&text, FIRST_TIME_X, y, color);

    grid.set(SEPARATOR_X, y + SEPARATOR_DY, Pixel::Primary);

    let (text, color) = time_cell(arrivals.get(1));
    grid.draw_text(&text, SECOND_TIME_X, y, color);
}

/// Minutes text and color for one slot: due or one minute out is highlighted.
pub fn time_cell(arrival: Option<&Arrival>) -> (String, Pixel) {
    match arrival {
        Some(a) if a.minutes_until_arrival <= 1 => (a.minutes_until_arrival.to_string(), Pixel::Highlight),
        Some(a) => (a.minutes_until_arrival.to_string(), Pixel::Primary),
        None => (PLACEHOLDER.to_string(), Pixel::Primary),
    }
}

// Right edge mirrors the left margin; long strings stop at `min_x` and clip.
fn right_aligned(text: &str, min_x: i32) -> i32 {
    let width = font::text_width(text) as i32;
    (GRID_SIZE as i32 - MARGIN - width).max(min_x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::CITY_TZ;
    use chrono::TimeZone;

    fn frame_at<'a>(now: DateTime<Tz>, commuter: &'a [Arrival], bus: &'a [Arrival], temperature: Option<i32>) -> BoardFrame<'a> {
        BoardFrame {
            now,
            temperature,
            commuter_label: "ME",
            commuter,
            bus_label: "#2",
            bus,
        }
    }

    // Wednesday 2025-01-15 09:05
    fn morning() -> DateTime<Tz> {
        CITY_TZ.with_ymd_and_hms(2025, 1, 15, 9, 5, 0).unwrap()
    }

    fn region(grid: &PixelGrid, x0: i32, y0: i32, w: i32, h: i32) -> Vec<Pixel> {
        let mut cells = Vec::new();
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                cells.push(grid.get(x, y).unwrap_or_default());
            }
        }
        cells
    }

    fn drawn(text: &str, color: Pixel) -> Vec<Pixel> {
        let mut scratch = PixelGrid::new();
        let width = font::text_width(text) as i32;
        scratch.draw_text(text, 0, 0, color);
        region(&scratch, 0, 0, width, 5)
    }

    fn bus(minutes: u32) -> Arrival {
        Arrival::bus("2", "State & Lake", "Hyde Park", minutes)
    }

    #[test]
    fn out_of_bounds_text_never_touches_grid() {
        let mut grid = PixelGrid::new();
        grid.draw_text("88", -20, 3, Pixel::Primary);
        grid.draw_text("88", 40, 3, Pixel::Primary);
        grid.draw_text("88", 3, -9, Pixel::Primary);
        grid.draw_text("88", 3, 32, Pixel::Primary);
        assert_eq!(grid, PixelGrid::new());
        assert!(!grid.set(32, 0, Pixel::Primary));
        assert!(!grid.set(0, -1, Pixel::Primary));
    }

    #[test]
    fn partially_visible_text_is_clipped() {
        let mut grid = PixelGrid::new();
        grid.draw_text("-", 30, 0, Pixel::Primary);
        assert_eq!(grid.get(30, 2), Some(Pixel::Primary));
        assert_eq!(grid.get(31, 2), Some(Pixel::Primary));
        assert_eq!(grid.count(Pixel::Primary), 2);
    }

    #[test]
    fn unknown_characters_take_no_space() {
        let mut with_unknown = PixelGrid::new();
        let end = with_unknown.draw_text("1z2", 0, 0, Pixel::Primary);
        let mut plain = PixelGrid::new();
        plain.draw_text("12", 0, 0, Pixel::Primary);

        assert_eq!(with_unknown, plain);
        assert_eq!(end, 8);
    }

    #[test]
    fn placeholder_is_two_primary_dashes() {
        let mut grid = PixelGrid::new();
        grid.draw_text("--", 4, 4, Pixel::Primary);

        assert_eq!(grid.count(Pixel::Primary), 6);
        for x in [4, 5, 6, 8, 9, 10] {
            assert_eq!(grid.get(x, 6), Some(Pixel::Primary));
        }
        assert_eq!(grid.get(7, 6), Some(Pixel::Off));
    }

    #[test]
    fn time_cell_color_rule() {
        assert_eq!(time_cell(Some(&bus(0))), ("0".to_string(), Pixel::Highlight));
        assert_eq!(time_cell(Some(&bus(1))), ("1".to_string(), Pixel::Highlight));
        assert_eq!(time_cell(Some(&bus(2))), ("2".to_string(), Pixel::Primary));
        assert_eq!(time_cell(None), ("--".to_string(), Pixel::Primary));
    }

    #[test]
    fn header_rows() {
        let grid = render_board(&frame_at(morning(), &[], &[], Some(28)));

        assert_eq!(region(&grid, 1, 1, 13, 5), drawn("WED", Pixel::Primary));
        // "1/15" is 15 wide; pinned at the minimum column it ends at column 31
        assert_eq!(region(&grid, 17, 1, 15, 5), drawn("1/15", Pixel::Primary));
        assert!(region(&grid, 14, 1, 3, 5).iter().all(|&p| p == Pixel::Off));
        assert_eq!(region(&grid, 1, 8, 11, 5), drawn("28F", Pixel::Primary));
        // "9:05" is 13 wide
        assert_eq!(region(&grid, 18, 8, 13, 5), drawn("9:05", Pixel::Primary));
    }

    #[test]
    fn three_glyph_temperature_leaves_gap_before_clock() {
        let late = CITY_TZ.with_ymd_and_hms(2025, 1, 15, 12, 45, 0).unwrap();
        let grid = render_board(&frame_at(late, &[], &[], Some(-4)));

        assert_eq!(region(&grid, 1, 8, 11, 5), drawn("-4F", Pixel::Primary));
        assert!(region(&grid, 12, 8, 3, 5).iter().all(|&p| p == Pixel::Off));
        assert_eq!(region(&grid, CLOCK_MIN_X, 8, 17, 5), drawn("12:45", Pixel::Primary));
    }

    #[test]
    fn date_never_overlaps_day() {
        let late = CITY_TZ.with_ymd_and_hms(2025, 12, 31, 0, 45, 0).unwrap();
        let grid = render_board(&frame_at(late, &[], &[], None));

        // WED ends at column 13, 12/31 starts at the minimum column
        assert!(region(&grid, 14, 1, 3, 5).iter().all(|&p| p == Pixel::Off));
        let mut expected = PixelGrid::new();
        expected.draw_text("12/31", DATE_MIN_X, 1, Pixel::Primary);
        assert_eq!(region(&grid, 14, 1, 18, 5), region(&expected, 14, 1, 18, 5));
        // midnight hour reads as 12
        assert_eq!(region(&grid, 15, 8, 17, 5), drawn("12:45", Pixel::Primary));
    }

    #[test]
    fn unknown_temperature_leaves_slot_dark() {
        let grid = render_board(&frame_at(morning(), &[], &[], None));
        assert!(region(&grid, 0, 8, 14, 5).iter().all(|&p| p == Pixel::Off));
    }

    #[test]
    fn dividers_span_full_width() {
        let grid = render_board(&frame_at(morning(), &[], &[], None));
        for y in [14, 24] {
            assert!(region(&grid, 0, y, 32, 1).iter().all(|&p| p == Pixel::Primary));
        }
    }

    #[test]
    fn empty_sources_render_placeholders() {
        let grid = render_board(&frame_at(morning(), &[], &[], None));

        for y in [COMMUTER_ROW, BUS_ROW] {
            assert_eq!(region(&grid, FIRST_TIME_X, y, 7, 5), drawn("--", Pixel::Primary));
            assert_eq!(region(&grid, SECOND_TIME_X, y, 7, 5), drawn("--", Pixel::Primary));
            assert_eq!(grid.get(SEPARATOR_X, y + SEPARATOR_DY), Some(Pixel::Primary));
        }
        assert_eq!(region(&grid, 1, COMMUTER_ROW, 9, 5), drawn("ME", Pixel::Primary));
        assert_eq!(region(&grid, 1, BUS_ROW, 9, 5), drawn("#2", Pixel::Primary));
        assert_eq!(grid.count(Pixel::Highlight), 0);
    }

    #[test]
    fn arrivals_follow_color_rule() {
        let commuter = [Arrival::commuter("ME", "320", 1), Arrival::commuter("ME", "322", 14)];
        let buses = [bus(0), bus(2)];
        let grid = render_board(&frame_at(morning(), &commuter, &buses, None));

        assert_eq!(region(&grid, FIRST_TIME_X, COMMUTER_ROW, 3, 5), drawn("1", Pixel::Highlight));
        assert_eq!(region(&grid, SECOND_TIME_X, COMMUTER_ROW, 7, 5), drawn("14", Pixel::Primary));
        assert_eq!(region(&grid, FIRST_TIME_X, BUS_ROW, 3, 5), drawn("0", Pixel::Highlight));
        assert_eq!(region(&grid, SECOND_TIME_X, BUS_ROW, 3, 5), drawn("2", Pixel::Primary));
    }

    #[test]
    fn serializes_as_nested_values() {
        let mut grid = PixelGrid::new();
        grid.set(0, 0, Pixel::Primary);
        grid.set(1, 0, Pixel::Highlight);

        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json.as_array().map(|rows| rows.len()), Some(GRID_SIZE));
        assert_eq!(json[0][0], 1);
        assert_eq!(json[0][1], 2);
        assert_eq!(json[31][31], 0);
    }
}
