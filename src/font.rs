// 5-row bitmap font for the 32x32 board.
//
// Each row is a bit mask read from the most significant of `width` bits, so
// 0b100 in a 3-wide glyph is the leftmost column.

pub const GLYPH_HEIGHT: usize = 5;
pub const GLYPH_SPACING: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub width: usize,
    pub rows: [u8; GLYPH_HEIGHT],
}

impl Glyph {
    const fn new(width: usize, rows: [u8; GLYPH_HEIGHT]) -> Self {
        Glyph { width, rows }
    }

    pub fn is_set(&self, col: usize, row: usize) -> bool {
        col < self.width && row < GLYPH_HEIGHT && (self.rows[row] >> (self.width - 1 - col)) & 1 == 1
    }

    /// Lit cells as (column, row) offsets.
    pub fn lit(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..GLYPH_HEIGHT).flat_map(move |row| (0..self.width).filter(move |&col| self.is_set(col, row)).map(move |col| (col, row)))
    }
}

pub fn glyph(c: char) -> Option<Glyph> {
    let g = match c {
        '0' => Glyph::new(3, [0b111, 0b101, 0b101, 0b101, 0b111]),
        '1' => Glyph::new(3, [0b010, 0b110, 0b010, 0b010, 0b111]),
        '2' => Glyph::new(3, [0b111, 0b001, 0b111, 0b100, 0b111]),
        '3' => Glyph::new(3, [0b111, 0b001, 0b111, 0b001, 0b111]),
        '4' => Glyph::new(3, [0b101, 0b101, 0b111, 0b001, 0b001]),
        '5' => Glyph::new(3, [0b111, 0b100, 0b111, 0b001, 0b111]),
        '6' => Glyph::new(3, [0b111, 0b100, 0b111, 0b101, 0b111]),
        '7' => Glyph::new(3, [0b111, 0b001, 0b001, 0b001, 0b001]),
        '8' => Glyph::new(3, [0b111, 0b101, 0b111, 0b101, 0b111]),
        '9' => Glyph::new(3, [0b111, 0b101, 0b111, 0b001, 0b111]),
        'A' => Glyph::new(3, [0b010, 0b101, 0b111, 0b101, 0b101]),
        'D' => Glyph::new(3, [0b110, 0b101, 0b101, 0b101, 0b110]),
        'E' => Glyph::new(3, [0b111, 0b100, 0b111, 0b100, 0b111]),
        'F' => Glyph::new(3, [0b111, 0b100, 0b111, 0b100, 0b100]),
        'H' => Glyph::new(3, [0b101, 0b101, 0b111, 0b101, 0b101]),
        'I' => Glyph::new(3, [0b111, 0b010, 0b010, 0b010, 0b111]),
        'M' => Glyph::new(5, [0b10001, 0b11011, 0b10101, 0b10001, 0b10001]),
        'N' => Glyph::new(5, [0b10001, 0b11001, 0b10101, 0b10011, 0b10001]),
        'O' => Glyph::new(3, [0b010, 0b101, 0b101, 0b101, 0b010]),
        'R' => Glyph::new(3, [0b110, 0b101, 0b110, 0b101, 0b101]),
        'S' => Glyph::new(3, [0b111, 0b100, 0b111, 0b001, 0b111]),
        'T' => Glyph::new(3, [0b111, 0b010, 0b010, 0b010, 0b010]),
        'U' => Glyph::new(3, [0b101, 0b101, 0b101, 0b101, 0b111]),
        'W' => Glyph::new(5, [0b10001, 0b10001, 0b10101, 0b11011, 0b10001]),
        '#' => Glyph::new(5, [0b01010, 0b11111, 0b01010, 0b11111, 0b01010]),
        '/' => Glyph::new(3, [0b001, 0b010, 0b010, 0b010, 0b100]),
        ':' => Glyph::new(1, [0, 1, 0, 1, 0]),
        '-' => Glyph::new(3, [0b000, 0b000, 0b111, 0b000, 0b000]),
        '.' => Glyph::new(1, [0, 0, 0, 0, 1]),
        ' ' => Glyph::new(1, [0, 0, 0, 0, 0]),
        _ => return None,
    };
    Some(g)
}

/// Horizontal extent of `text` in cells, without trailing spacing.
/// Characters missing from the font take no space.
pub fn text_width(text: &str) -> usize {
    let (total, count) = text
        .chars()
        .filter_map(glyph)
        .fold((0, 0), |(total, count), g| (total + g.width, count + 1));

    if count == 0 {
        0
    } else {
        total + (count - 1) * GLYPH_SPACING
    }
}
