//! State digest for desync detection.
//!
//! Peers running the same battle compare digests frame by frame; the first
//! mismatch marks the frame where their simulations diverged.

use sha2::{Digest, Sha256};

use super::Field;

impl Field {
    /// SHA-256 over the simulation state.
    ///
    /// Covers the frame counter, RNG state, every playable tile's terrain and
    /// team, and every registered entity. Presentation state such as
    /// highlights and animations is left out.
    pub fn state_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();

        hasher.update(self.frame.0.to_le_bytes());
        hasher.update(self.rng.state().to_le_bytes());
        hasher.update([u8::from(self.battle_active)]);

        for tile in self.tiles().filter(|t| !t.is_edge()) {
            hasher.update(tile.x().to_le_bytes());
            hasher.update(tile.y().to_le_bytes());
            hasher.update(tile.state().as_ref());
            hasher.update(tile.team().as_ref());
        }

        for entity in self.entities.values() {
            hasher.update(entity.id().0.to_le_bytes());
            hasher.update(entity.kind().as_ref());
            hasher.update(entity.name());
            hasher.update(entity.team().as_ref());
            let (x, y) = entity.position().map_or((-1, -1), |p| (p.x, p.y));
            hasher.update(x.to_le_bytes());
            hasher.update(y.to_le_bytes());
            hasher.update(entity.health().to_le_bytes());
            hasher.update([u8::from(entity.is_deleted())]);
            hasher.update((entity.status().queued_hits() as u64).to_le_bytes());
        }

        hasher.finalize().into()
    }
}
