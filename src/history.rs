use crate::castling::CastlingRights;
use crate::piece::Piece;
use crate::r#move::Move;
use crate::square::Square;

/// One snapshot per made move, holding everything `unmake` cannot recompute.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HistoryEntry {
    pub move_played: Move,
    pub captured_piece: Option<Piece>,
    pub ep_target: Option<Square>,
    pub castling_rights: CastlingRights,
    pub fifty: u32,
}
