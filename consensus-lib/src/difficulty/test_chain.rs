use crate::chain_index::BlockIndexArena;

/// Genesis timestamp of the main network, used as the base time of test chains.
pub(crate) const BASE_TIME: u32 = 1231006505;

/// Builds `count` blocks starting at `origin_height`, evenly spaced and all
/// carrying the same compact target.
pub(crate) fn build_chain(
    origin_height: u32,
    count: u32,
    spacing: u32,
    bits: u32,
) -> BlockIndexArena {
    let mut arena = BlockIndexArena::with_origin(origin_height);
    for i in 0..count {
        append(&mut arena, BASE_TIME + i * spacing, bits);
    }
    arena
}

/// Appends a block whose hash encodes its position in the arena.
pub(crate) fn append(arena: &mut BlockIndexArena, time: u32, bits: u32) -> u32 {
    let mut hash = [0u8; 32];
    hash[..8].copy_from_slice(&(arena.len() as u64).to_le_bytes());
    arena.append(hash, time, bits).unwrap()
}
