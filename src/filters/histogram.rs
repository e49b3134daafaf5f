//! Per-channel frequency table with cumulative-distribution equalization.
//!
//! A histogram is built from one full scan, equalized once, and then used
//! read-only as a lookup table. Before `equalize` the remap tables are the
//! identity.

use crate::buffer::{Color, PixelBuffer};

/// Color channel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    counts: [[u32; 256]; 3],
    remap: [[u8; 256]; 3],
    total: u64,
}

impl Histogram {
    /// Count every R, G and B value of `source`.
    pub fn build(source: &PixelBuffer) -> Self {
        let mut counts = [[0u32; 256]; 3];
        let view = source.view();
        for y in 0..source.height() {
            for x in 0..source.width() {
                for (c, table) in counts.iter_mut().enumerate() {
                    table[view[[y, x, c]] as usize] += 1;
                }
            }
        }

        let mut identity = [0u8; 256];
        for (v, slot) in identity.iter_mut().enumerate() {
            *slot = v as u8;
        }

        Histogram {
            counts,
            remap: [identity; 3],
            total: (source.width() * source.height()) as u64,
        }
    }

    pub fn counts(&self, channel: Channel) -> &[u32; 256] {
        &self.counts[channel.index()]
    }

    pub fn remap(&self, channel: Channel) -> &[u8; 256] {
        &self.remap[channel.index()]
    }

    /// Number of pixels scanned.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Replace the remap tables with the scaled cumulative distribution.
    ///
    /// The last cumulative value (the pixel count) maps to 255.
    pub fn equalize(&mut self) {
        if self.total == 0 {
            return;
        }
        for c in 0..3 {
            let mut cumulative: u64 = 0;
            for v in 0..256 {
                cumulative += self.counts[c][v] as u64;
                self.remap[c][v] = (cumulative * 255 / self.total).min(255) as u8;
            }
        }
    }

    /// Remap each channel of `color` independently; alpha passes through.
    pub fn lookup(&self, color: Color) -> Color {
        Color::rgba(
            self.remap[0][color.r as usize],
            self.remap[1][color.g as usize],
            self.remap[2][color.b as usize],
            color.a,
        )
    }

    /// Rewrite every pixel of `target` through the remap tables.
    pub fn apply(&self, target: &PixelBuffer) -> PixelBuffer {
        let mut output = target.blank_like();
        for y in 0..target.height() {
            for x in 0..target.width() {
                output.put(x, y, self.lookup(target.pixel(x, y)));
            }
        }
        output
    }
}
