//! AZERTY keyboard layout mapping letters to bars, left to right.

/// Keys in bar order: top row, home row, then `W` and `X`
pub const KEYS: [char; 22] = [
    'A', 'Z', 'E', 'R', 'T', 'Y', 'U', 'I', 'O', 'P', 'Q', 'S', 'D', 'F', 'G', 'H', 'J', 'K',
    'L', 'M', 'W', 'X',
];

/// Bar index for a key (case-insensitive)
pub fn key_index(key: char) -> Option<usize> {
    let key = key.to_ascii_uppercase();
    KEYS.iter().position(|&k| k == key)
}

/// Key bound to a bar, if any
pub fn key_for(index: usize) -> Option<char> {
    KEYS.get(index).copied()
}
