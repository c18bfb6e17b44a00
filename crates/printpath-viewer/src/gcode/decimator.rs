//! Row-based decimation of extruding segments
//!
//! Drops whole print rows so very large files stay under the primitive
//! budget. A row boundary fires when the render height strictly exceeds
//! the previously recorded row height. The first two rows always pass so
//! the base layers stay visible at any divisor.

#[derive(Debug, Clone)]
pub struct Decimator {
    every_nth_row: i64,
    row_counter: i64,
    row_height: f32,
}

impl Decimator {
    pub fn new(every_nth_row: u32) -> Self {
        Self {
            every_nth_row: i64::from(every_nth_row.max(1)),
            // -1 until the first boundary fires, so segments emitted
            // before any height change fall under the first-rows carve-out.
            row_counter: -1,
            row_height: 0.0,
        }
    }

    /// Gate an extruding segment at the given render height. Returns
    /// whether the segment should be kept.
    pub fn admit(&mut self, height: f32) -> bool {
        if self.every_nth_row <= 1 {
            return true;
        }
        if height > self.row_height {
            self.row_counter += 1;
            self.row_height = height;
        }
        self.row_counter <= 1 || self.row_counter % self.every_nth_row == 0
    }

    /// Number of row boundaries observed so far.
    pub fn rows_seen(&self) -> u64 {
        (self.row_counter + 1).max(0) as u64
    }
}
