//! Display-name handling for connecting players.

use rand::Rng;
use shared::MAX_NAME_LEN;

/// Resolves the identity a session plays under. A usable requested name is
/// trimmed and capped; a missing or blank one falls back to a guest label.
/// Resolution never fails, so a player always gets in.
pub fn resolve_identity<R: Rng>(requested: Option<&str>, rng: &mut R) -> String {
    match requested {
        Some(name) if !name.trim().is_empty() => name.trim().chars().take(MAX_NAME_LEN).collect(),
        _ => guest_label(rng),
    }
}

pub fn guest_label<R: Rng>(rng: &mut R) -> String {
    format!("Guest-{}", rng.gen_range(0..10_000))
}
