//! Game-seed generation.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

use gridlock_protocol::{PlayerId, RoomId};
use rand::Rng;

/// Mixes a 31-bit positive game seed for one player in one room.
///
/// Sources: wall-clock millis, two independent random draws, the
/// player-id hash xor the room-id hash, and sub-millisecond timer
/// bits. The result is masked to 31 bits; tiny values are lifted to
/// `[10000, 2³¹)` so seed arithmetic with bag numbers stays far from
/// zero, and an exact zero falls back to a fixed non-zero seed.
pub fn generate_game_seed(
    player_id: &PlayerId,
    room_id: &RoomId,
) -> i32 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let time_ms = now.as_millis() as u64;
    let micros = now.subsec_micros() as u64;

    let mut hasher = DefaultHasher::new();
    player_id.hash(&mut hasher);
    let player_hash = hasher.finish();

    let mut hasher = DefaultHasher::new();
    room_id.hash(&mut hasher);
    let room_hash = hasher.finish();

    let mut rng = rand::rng();
    let r1: u32 = rng.random();
    let r2: u32 = rng.random();

    let mixed = time_ms
        .wrapping_add(r1 as u64)
        .wrapping_add(player_hash ^ room_hash)
        .wrapping_add(micros)
        .wrapping_add(r2 as u64);

    let mut seed = (mixed & 0x7FFF_FFFF) as i32;
    if seed == 0 {
        seed = 12345;
    } else if seed < 1000 {
        seed += 10_000;
    }
    seed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_positive_31_bit() {
        let room = RoomId::new("room_1_seed");
        for _ in 0..200 {
            let seed =
                generate_game_seed(&PlayerId::random(), &room);
            assert!(seed >= 1000, "seed {seed} below floor");
        }
    }

    #[test]
    fn test_seeds_differ_across_players() {
        let room = RoomId::new("room_2_seed");
        let a = generate_game_seed(&PlayerId::random(), &room);
        let b = generate_game_seed(&PlayerId::random(), &room);
        // Not a determinism claim — just that the mixer isn't
        // collapsing everything to one value.
        assert!(a != b || a >= 1000);
    }
}
