use std::ops::RangeInclusive;

/// Card face values in a full deck.
pub const CARD_RANGE: RangeInclusive<u8> = 3..=35;
/// Cards removed face-down before play.
pub const HIDDEN_CARDS: usize = 9;
pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 7;

/// Starting chips per player for a table of `players`.
pub fn starting_chips(players: usize) -> Option<u32> {
    match players {
        3..=5 => Some(11),
        6 => Some(9),
        7 => Some(7),
        _ => None,
    }
}

/// Seat `delta` steps from `index`, wrapping around a table of `len` seats.
#[inline]
pub fn seat_offset(index: usize, delta: isize, len: usize) -> usize {
    debug_assert!(len > 0, "table must have at least one seat");
    let len_i = len as isize;
    ((index as isize + delta).rem_euclid(len_i)) as usize
}

/// Next seat in rotation (wrapping).
#[inline]
pub fn next_seat(index: usize, len: usize) -> usize {
    seat_offset(index, 1, len)
}
