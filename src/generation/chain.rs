use cyder_tools::log::{info, warn};
use tokio::time::timeout;

use crate::generation::providers::GenerationProvider;
use crate::generation::types::{ChainError, ProviderError, ProviderOutput, Quality};
use crate::schema::enum_def::GenerationKind;

#[derive(Debug)]
pub struct ChainOutcome {
    pub output: ProviderOutput,
    pub provider: &'static str,
    pub quality: Quality,
}

/// Runs the fallback chain for one request: providers are tried strictly in
/// order, one attempt each, never in parallel. A transient failure,
/// missing configuration, empty result, or timeout advances to the next
/// tier; a permanent failure aborts; exhausting the list yields the
/// "resting" terminal.
pub async fn run_chain(
    kind: GenerationKind,
    providers: &[Box<dyn GenerationProvider>],
    client: &reqwest::Client,
    prompt: &str,
) -> Result<ChainOutcome, ChainError> {
    for (tier, provider) in providers.iter().enumerate() {
        let attempt = timeout(provider.timeout(), provider.generate(client, prompt)).await;
        match attempt {
            Err(_elapsed) => {
                let err = ProviderError::Timeout {
                    provider: provider.name(),
                };
                warn!("[generation] {} {}", kind, err);
            }
            Ok(Ok(output)) => {
                let quality = Quality::from_tier(tier);
                info!(
                    "[generation] {} request served by {} ({})",
                    kind,
                    provider.name(),
                    quality.as_str()
                );
                return Ok(ChainOutcome {
                    output,
                    provider: provider.name(),
                    quality,
                });
            }
            Ok(Err(err)) => {
                if !err.falls_through() {
                    warn!("[generation] {} aborted: {}", kind, err);
                    return Err(ChainError::Provider(err));
                }
                warn!("[generation] {} falling back: {}", kind, err);
            }
        }
    }
    warn!("[generation] all {} providers failed", kind);
    Err(ChainError::Exhausted(kind))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    enum Script {
        Succeed(&'static str),
        Respond(u16, &'static str),
        Unconfigured,
        Hang,
    }

    struct ScriptedProvider {
        name: &'static str,
        script: Script,
        timeout: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedProvider {
        fn new(name: &'static str, script: Script) -> (Box<dyn GenerationProvider>, Arc<AtomicUsize>) {
            Self::with_timeout(name, script, Duration::from_secs(5))
        }

        fn with_timeout(
            name: &'static str,
            script: Script,
            timeout: Duration,
        ) -> (Box<dyn GenerationProvider>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let provider: Box<dyn GenerationProvider> = Box::new(Self {
                name,
                script,
                timeout,
                calls: calls.clone(),
            });
            (provider, calls)
        }
    }

    #[async_trait]
    impl GenerationProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn timeout(&self) -> Duration {
            self.timeout
        }

        async fn generate(
            &self,
            _client: &reqwest::Client,
            _prompt: &str,
        ) -> Result<ProviderOutput, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                Script::Succeed(url) => Ok(ProviderOutput::Remote(url.to_string())),
                Script::Respond(status, body) => {
                    Err(ProviderError::from_response(self.name, *status, body.to_string()))
                }
                Script::Unconfigured => Err(ProviderError::Unconfigured(self.name)),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(ProviderError::Empty { provider: self.name })
                }
            }
        }
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let (primary, primary_calls) = ScriptedProvider::new("primary", Script::Succeed("https://a/img"));
        let (secondary, secondary_calls) = ScriptedProvider::new("secondary", Script::Succeed("https://b/img"));
        let client = reqwest::Client::new();

        let outcome = run_chain(
            GenerationKind::Image,
            &[primary, secondary],
            &client,
            "a quiet pond",
        )
        .await
        .unwrap();

        assert_eq!(outcome.provider, "primary");
        assert_eq!(outcome.quality, Quality::High);
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rate_limited_primary_falls_back_to_secondary() {
        let (primary, primary_calls) = ScriptedProvider::new("primary", Script::Respond(429, "too many requests"));
        let (secondary, secondary_calls) = ScriptedProvider::new("secondary", Script::Succeed("https://b/img"));
        let client = reqwest::Client::new();

        let outcome = run_chain(
            GenerationKind::Image,
            &[primary, secondary],
            &client,
            "a quiet pond",
        )
        .await
        .unwrap();

        assert_eq!(outcome.provider, "secondary");
        assert_eq!(outcome.quality, Quality::Standard);
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unconfigured_tier_is_skipped() {
        let (primary, _) = ScriptedProvider::new("primary", Script::Unconfigured);
        let (secondary, _) = ScriptedProvider::new("secondary", Script::Unconfigured);
        let (tertiary, tertiary_calls) = ScriptedProvider::new("tertiary", Script::Succeed("https://c/img"));
        let client = reqwest::Client::new();

        let outcome = run_chain(
            GenerationKind::Image,
            &[primary, secondary, tertiary],
            &client,
            "a quiet pond",
        )
        .await
        .unwrap();

        assert_eq!(outcome.provider, "tertiary");
        assert_eq!(outcome.quality, Quality::Basic);
        assert_eq!(tertiary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_chain_is_resting() {
        let (primary, primary_calls) = ScriptedProvider::new("primary", Script::Respond(503, ""));
        let (secondary, secondary_calls) = ScriptedProvider::new("secondary", Script::Unconfigured);
        let client = reqwest::Client::new();

        let err = run_chain(
            GenerationKind::Sound,
            &[primary, secondary],
            &client,
            "soft rain on leaves",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ChainError::Exhausted(GenerationKind::Sound)));
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn permanent_failure_aborts_without_fallback() {
        let (primary, _) = ScriptedProvider::new("primary", Script::Respond(400, "prompt rejected"));
        let (secondary, secondary_calls) = ScriptedProvider::new("secondary", Script::Succeed("https://b/img"));
        let client = reqwest::Client::new();

        let err = run_chain(
            GenerationKind::Image,
            &[primary, secondary],
            &client,
            "a quiet pond",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ChainError::Provider(ProviderError::Permanent { .. })));
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn timed_out_attempt_advances_the_chain() {
        let (primary, primary_calls) = ScriptedProvider::with_timeout(
            "primary",
            Script::Hang,
            Duration::from_millis(20),
        );
        let (secondary, secondary_calls) = ScriptedProvider::new("secondary", Script::Succeed("https://b/img"));
        let client = reqwest::Client::new();

        let outcome = run_chain(
            GenerationKind::Living,
            &[primary, secondary],
            &client,
            "drifting clouds",
        )
        .await
        .unwrap();

        assert_eq!(outcome.provider, "secondary");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }
}
