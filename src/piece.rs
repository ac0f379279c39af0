use crate::piece::Color::Dark;
use crate::piece::PieceType::{Bishop, King, Knight, Pawn, Queen, Rook};
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}
impl PieceType {
    /// Capture worth of each piece type, pawn through king.
    pub const VALUE: [i32; 6] = [100, 300, 300, 500, 900, 0];

    /// Promotion candidates, in the order they are generated.
    pub const PROMOTABLE: [PieceType; 4] = [Knight, Bishop, Rook, Queen];

    pub fn from_determinant(i: usize) -> Option<PieceType> {
        match i {
            0 => Some(Pawn),
            1 => Some(Knight),
            2 => Some(Bishop),
            3 => Some(Rook),
            4 => Some(Queen),
            5 => Some(King),
            _ => None,
        }
    }
    pub fn value(&self) -> i32 {
        Self::VALUE[*self as usize]
    }
    pub fn can_slide(&self) -> bool {
        matches!(self, Bishop | Queen | Rook)
    }
}
impl Display for PieceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Pawn => "p",
                Knight => "n",
                Bishop => "b",
                Rook => "r",
                Queen => "q",
                King => "k",
            }
        )
    }
}

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq)]
pub enum Color {
    Light,
    Dark,
}
impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }
}
impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", if self == &Dark { "b" } else { "w" })
    }
}

impl Piece {
    pub fn from_char(c: char) -> Option<Piece> {
        let piece_type = match c.to_lowercase().next().unwrap_or('_') {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        let color = if c.is_lowercase() {
            Color::Dark
        } else {
            Color::Light
        };
        Some(Piece { piece_type, color })
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = self.piece_type.to_string();
        write!(
            f,
            "{}",
            if self.color == Color::Light {
                s.to_uppercase()
            } else {
                s
            }
        )
    }
}
