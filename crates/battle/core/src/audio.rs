//! Audio cue sink.
//!
//! The engine only fires cues; playback, mixing and resource loading belong to
//! the host.

/// Sound cue raised by the simulation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum AudioEvent {
    Hurt,
    Guard,
    CounterHit,
    BubblePop,
    PanelCrack,
    PanelBreak,
    PanelReturn,
    Volcano,
}

/// Channel priority for a cue. Hosts may drop lower priorities under load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AudioPriority {
    Lowest,
    Low,
    #[default]
    High,
    Highest,
}

/// Fire-and-forget audio collaborator.
pub trait AudioSink {
    fn play(&self, event: AudioEvent, priority: AudioPriority);
}

/// Sink that drops every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&self, _event: AudioEvent, _priority: AudioPriority) {}
}
