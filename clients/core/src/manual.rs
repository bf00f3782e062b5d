//! Manual coil control from the numeric keypad
//!
//! The keypad layout mirrors the coil positions around the workspace,
//! key 5 in the middle is not used.

use ferroservo_clients_io::{ActivationMask, NUMBER_OF_COILS};

/// Keypad key of each coil
pub const COIL_KEYS: [u8; NUMBER_OF_COILS] = [9, 6, 3, 2, 1, 4, 7, 8];

/// Coil driven by a keypad key
pub fn coil_of_key(key: u8) -> Option<usize> {
    COIL_KEYS.iter().position(|&k| k == key)
}

/// Activation mask of the held keypad keys
pub fn manual_mask<I>(held_keys: I) -> ActivationMask
where
    I: IntoIterator<Item = u8>,
{
    held_keys.into_iter().filter_map(coil_of_key).collect()
}
