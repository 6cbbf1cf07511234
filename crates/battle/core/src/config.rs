/// Battle configuration constants and tunable parameters.
///
/// All durations are in simulation frames (60 per second).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Playable columns, excluding the edge ring.
    pub width: i32,
    /// Playable rows, excluding the edge ring.
    pub height: i32,
    /// Seed shared by every peer for [`crate::SyncedRng`].
    pub seed: u64,
    pub tile: TileTimings,
    pub status: StatusTimings,
    pub hazard: HazardTuning,
}

impl BattleConfig {
    pub const DEFAULT_WIDTH: i32 = 6;
    pub const DEFAULT_HEIGHT: i32 = 3;
    pub const DEFAULT_SEED: u64 = 0;

    pub fn new() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            seed: Self::DEFAULT_SEED,
            tile: TileTimings::default(),
            status: StatusTimings::default(),
            hazard: HazardTuning::default(),
        }
    }

    pub fn with_dimensions(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Self::new()
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Tile environment timers.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TileTimings {
    /// Frames a broken tile stays broken before it regenerates.
    pub broken_cooldown_frames: u32,
    /// Frames a stolen tile stays with the thief before it may revert.
    pub team_cooldown_frames: u32,
    /// Frames a stolen tile flickers after changing hands.
    pub flicker_frames: u32,
    /// Frames between volcano eruptions.
    pub volcano_eruption_frames: u32,
}

impl Default for TileTimings {
    fn default() -> Self {
        Self {
            broken_cooldown_frames: 1800,
            team_cooldown_frames: 1800,
            flicker_frames: 180,
            volcano_eruption_frames: 240,
        }
    }
}

/// Durations of the statuses a hit can inflict.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatusTimings {
    pub flinch_frames: u32,
    pub stun_frames: u32,
    pub counter_stun_frames: u32,
    pub freeze_frames: u32,
    pub flash_frames: u32,
    pub bubble_frames: u32,
    pub root_frames: u32,
    pub shake_frames: u32,
    pub blind_frames: u32,
    pub confuse_frames: u32,
    /// Frames spent crossing one tile while dragged or sliding.
    pub slide_frames: u32,
}

impl Default for StatusTimings {
    fn default() -> Self {
        Self {
            flinch_frames: 20,
            stun_frames: 120,
            counter_stun_frames: 150,
            freeze_frames: 150,
            flash_frames: 120,
            bubble_frames: 150,
            root_frames: 120,
            shake_frames: 30,
            blind_frames: 300,
            confuse_frames: 110,
            slide_frames: 4,
        }
    }
}

/// Terrain hazard tuning.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HazardTuning {
    pub poison_interval_frames: u32,
    pub poison_damage: i32,
    pub lava_damage: i32,
    pub volcano_damage: i32,
    /// Frames a character stands on a conveyor before being pushed.
    pub conveyor_delay_frames: u32,
    pub grass_heal_interval_frames: u32,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            poison_interval_frames: 7,
            poison_damage: 1,
            lava_damage: 50,
            volcano_damage: 50,
            conveyor_delay_frames: 16,
            grass_heal_interval_frames: 180,
        }
    }
}
