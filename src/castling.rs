use crate::piece::Color;
use crate::piece::Color::{Dark, Light};
use crate::square::Square;
use std::fmt::{Display, Formatter};

/// Castling rights as a 4-bit mask: bit 0 light king-side, bit 1 light
/// queen-side, bit 2 dark king-side, bit 3 dark queen-side.
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq)]
pub struct CastlingRights(u8);

/// Per-square masks applied whenever a move touches the square, so moving
/// or capturing a king or rook drops the relevant rights.
const CASTLE_MASK: [u8; 64] = [
     7, 15, 15, 15,  3, 15, 15, 11,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    13, 15, 15, 15, 12, 15, 15, 14,
];

impl CastlingRights {
    pub fn new() -> CastlingRights {
        CastlingRights(0b1111)
    }
    pub fn none() -> CastlingRights {
        CastlingRights(0)
    }
    pub fn from_str(s: &str) -> CastlingRights {
        let mut res = CastlingRights(0);
        if s.contains('K') {
            res.0 |= 0b0001
        }
        if s.contains('Q') {
            res.0 |= 0b0010
        }
        if s.contains('k') {
            res.0 |= 0b0100
        }
        if s.contains('q') {
            res.0 |= 0b1000
        }
        res
    }

    /// Returns the (king-side, queen-side) rights of a given color
    pub fn get(&self, side: Color) -> (bool, bool) {
        match side {
            Light => (self.0 & 0b0001 != 0, self.0 & 0b0010 != 0),
            Dark => (self.0 & 0b0100 != 0, self.0 & 0b1000 != 0),
        }
    }

    /// Number of rights still held by a given color
    pub fn count(&self, side: Color) -> u32 {
        let (king, queen) = self.get(side);
        king as u32 + queen as u32
    }

    /// Drops whatever rights a move between the two squares invalidates
    pub fn update(&mut self, from: Square, to: Square) {
        self.0 &= CASTLE_MASK[from] & CASTLE_MASK[to];
    }
}

impl Display for CastlingRights {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }
        let (lking, lqueen) = self.get(Light);
        let (dking, dqueen) = self.get(Dark);
        write!(
            f,
            "{}{}{}{}",
            if lking { "K" } else { "" },
            if lqueen { "Q" } else { "" },
            if dking { "k" } else { "" },
            if dqueen { "q" } else { "" }
        )
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::new()
    }
}
