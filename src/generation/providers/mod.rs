use std::time::Duration;

use async_trait::async_trait;

use crate::generation::types::{ProviderError, ProviderOutput};
use crate::schema::enum_def::GenerationKind;

mod elevenlabs;
mod fal;
mod gemini;
mod pollinations;
mod replicate;

use elevenlabs::ElevenLabsSound;
use fal::{FalAnimateDiff, FalFluxImage, FalStableAudio};
use gemini::GeminiImage;
use pollinations::Pollinations;
use replicate::ReplicateVideo;

/// One tier of a fallback chain. Each adapter owns its request shape, its
/// response parsing, and its typed failure classification; the chain runner
/// only sees `ProviderError` variants.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    fn name(&self) -> &'static str;
    /// Budget for one attempt; the chain treats an overrun as a transient
    /// failure and moves on.
    fn timeout(&self) -> Duration;
    async fn generate(
        &self,
        client: &reqwest::Client,
        prompt: &str,
    ) -> Result<ProviderOutput, ProviderError>;
}

/// The ordered provider list per media kind. Position in the list is what
/// the quality label is derived from.
pub fn chain_for(kind: GenerationKind) -> Vec<Box<dyn GenerationProvider>> {
    match kind {
        GenerationKind::Image => vec![
            Box::new(FalFluxImage),
            Box::new(GeminiImage),
            Box::new(Pollinations),
        ],
        GenerationKind::Sound => vec![Box::new(FalStableAudio), Box::new(ElevenLabsSound)],
        GenerationKind::Living => vec![Box::new(FalAnimateDiff), Box::new(ReplicateVideo)],
    }
}
