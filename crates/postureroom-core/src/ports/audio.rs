use crate::error::SideEffectError;

/// Plays a short sound resource.
///
/// Playback is best effort. Implementations must return promptly and report
/// refusal (for example an autoplay policy) as an error instead of blocking.
pub trait AudioPort: Send + Sync {
    fn play(&self, resource: &str, volume: f32) -> Result<(), SideEffectError>;
}

/// Audio port that plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioPort for SilentAudio {
    fn play(&self, _resource: &str, _volume: f32) -> Result<(), SideEffectError> {
        Ok(())
    }
}
