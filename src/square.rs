pub type Square = usize;

/// Ranks are counted from the top of the board: `rank_of(0) == 0` is the
/// eighth rank, `rank_of(63) == 7` is the first.
pub fn rank_of(sq: Square) -> usize {
    sq >> 3
}
pub fn file_of(sq: Square) -> usize {
    sq & 7
}

/// Mirrors a square across the horizontal middle of the board, so the same
/// piece-square tables serve both colors.
pub fn mirror(sq: Square) -> Square {
    sq ^ 56
}

/// Parses a square from a given string slice,
/// only caring that the first two characters form a valid square representation
/// ```
/// use pangolin::square::parse_square;
/// assert_eq!(parse_square("e4"), Some(36));
/// assert_eq!(parse_square("a8"), Some(0));
/// assert_eq!(parse_square("h1someotherstuff"), Some(63));
/// assert_eq!(parse_square("randoma1stuff"), None);
/// assert_eq!(parse_square("k9"), None);
/// ```
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars_iter = s.chars();
    let file = match chars_iter.next() {
        Some(c) if ('a'..='h').contains(&c) => c as usize - 'a' as usize,
        _ => return None,
    };
    let rank = match chars_iter.next() {
        Some(c) => match c.to_digit(10) {
            Some(i) if i >= 1 && i <= 8 => 8 - i as usize,
            _ => return None,
        },
        _ => return None,
    };
    Some(rank * 8 + file)
}

/// Returns the string representation of a square
/// ```
/// use pangolin::square::square_representation;
/// assert_eq!(square_representation(36), Some(String::from("e4")));
/// assert_eq!(square_representation(0), Some(String::from("a8")));
/// assert_eq!(square_representation(65), None);
/// ```
pub fn square_representation(sq: Square) -> Option<String> {
    if !is_valid(sq) {
        return None;
    }
    let file = ('a'..='h').nth(file_of(sq))?;
    let rank = ('1'..='8').nth(7 - rank_of(sq))?;
    let mut repr = file.to_string();
    repr.push(rank);
    Some(repr)
}

/// Checks whether a given square is in bounds (0..64) or not
/// ```
/// use pangolin::square::is_valid;
/// assert!(is_valid(12));
/// ```
pub fn is_valid(sq: Square) -> bool {
    sq < 64
}
