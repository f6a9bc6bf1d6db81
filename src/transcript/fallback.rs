use serde::Serialize;
use std::sync::Arc;

use super::{Normalizer, TranscriptResult};
use crate::error::{ErrorKind, TranscriptError};
use crate::platform::{Platform, VideoReference};
use crate::sources::{Availability, AvailabilityProbe, TranscriptSource};

/// One backend + language preference, tried at most once per resolve
#[derive(Clone)]
pub struct Strategy {
    label: String,
    backend: &'static str,
    languages: Vec<String>,
    source: Arc<dyn TranscriptSource>,
}

impl Strategy {
    pub fn new(source: Arc<dyn TranscriptSource>, languages: Vec<String>) -> Self {
        let backend = source.name();
        let label = if languages.is_empty() {
            format!("{}[auto]", backend)
        } else {
            format!("{}[{}]", backend, languages.join(","))
        };
        Self {
            label,
            backend,
            languages,
            source,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy")
            .field("label", &self.label)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Succeeded { words: usize },
    Failed { kind: ErrorKind, message: String },
}

/// Diagnostic record of one strategy run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchAttempt {
    pub strategy: String,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

impl FetchAttempt {
    pub fn failed(strategy: impl Into<String>, error: &TranscriptError) -> Self {
        Self {
            strategy: strategy.into(),
            outcome: AttemptOutcome::Failed {
                kind: error.kind(),
                message: error.to_string(),
            },
        }
    }

    pub fn succeeded(strategy: impl Into<String>, result: &TranscriptResult) -> Self {
        Self {
            strategy: strategy.into(),
            outcome: AttemptOutcome::Succeeded {
                words: result.word_count(),
            },
        }
    }

    pub fn failure_kind(&self) -> Option<ErrorKind> {
        match &self.outcome {
            AttemptOutcome::Failed { kind, .. } => Some(*kind),
            AttemptOutcome::Succeeded { .. } => None,
        }
    }
}

/// A successful resolve
#[derive(Debug, Clone)]
pub struct Resolution {
    pub result: TranscriptResult,
    /// Backend that produced the result
    pub backend: &'static str,
    /// Every attempt in order, the successful one last
    pub attempts: Vec<FetchAttempt>,
}

/// Walks an ordered strategy list until one yields a usable transcript
pub struct FallbackOrchestrator {
    sources: Vec<Arc<dyn TranscriptSource>>,
    fallback_languages: Vec<String>,
    probe: Option<Arc<dyn AvailabilityProbe>>,
    normalizer: Normalizer,
}

impl FallbackOrchestrator {
    pub fn new(sources: Vec<Arc<dyn TranscriptSource>>) -> Self {
        Self {
            sources,
            fallback_languages: Vec::new(),
            probe: None,
            normalizer: Normalizer::default(),
        }
    }

    /// Secondary and tertiary languages tried after the caller's preference
    pub fn with_fallback_languages(mut self, languages: Vec<String>) -> Self {
        self.fallback_languages = languages;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn AvailabilityProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    /// Default strategy order, per backend that supports the reference: the
    /// caller's preference, each fallback language, then no preference at all.
    ///
    /// Repeats are dropped: an identical language list, or a single language
    /// that already led an earlier strategy for the same backend.
    pub fn plan(&self, reference: &VideoReference, preferred: &[String]) -> Vec<Strategy> {
        let mut candidates: Vec<Vec<String>> = vec![preferred.to_vec()];
        candidates.extend(self.fallback_languages.iter().map(|lang| vec![lang.clone()]));
        candidates.push(Vec::new());

        let mut strategies = Vec::new();
        for source in self.sources.iter().filter(|s| s.supports(reference)) {
            let mut seen: Vec<&Vec<String>> = Vec::new();
            let mut leads: Vec<Option<&String>> = Vec::new();

            for languages in &candidates {
                let lead = languages.first();
                if seen.contains(&languages) || (languages.len() == 1 && leads.contains(&lead)) {
                    continue;
                }
                seen.push(languages);
                leads.push(lead);
                strategies.push(Strategy::new(Arc::clone(source), languages.clone()));
            }
        }
        strategies
    }

    /// Resolve a transcript with the default strategy order
    pub async fn resolve(
        &self,
        reference: &VideoReference,
        preferred: &[String],
    ) -> Result<Resolution, TranscriptError> {
        let strategies = self.plan(reference, preferred);
        if strategies.is_empty() {
            return Err(TranscriptError::NotFound(format!(
                "no configured transcript backend can serve {} URLs",
                reference.platform().display_name()
            )));
        }
        self.resolve_with(reference, &strategies).await
    }

    /// Resolve a transcript with an explicit strategy list
    pub async fn resolve_with(
        &self,
        reference: &VideoReference,
        strategies: &[Strategy],
    ) -> Result<Resolution, TranscriptError> {
        self.precheck(reference).await?;

        let mut attempts = Vec::with_capacity(strategies.len());

        for strategy in strategies {
            if !strategy.source.supports(reference) {
                tracing::debug!(
                    "Skipping strategy {}: backend cannot serve this URL",
                    strategy.label()
                );
                continue;
            }

            tracing::info!(
                platform = %reference.platform(),
                "Trying strategy {} for {}",
                strategy.label(),
                reference.canonical()
            );

            let requested = strategy.languages.first().map(String::as_str);
            let outcome = match strategy.source.fetch(reference, &strategy.languages).await {
                Ok(raw) => self.normalizer.normalize(&raw, reference.platform(), requested),
                Err(err) => Err(err),
            };

            match outcome {
                Ok(result) => {
                    tracing::info!(
                        "Strategy {} succeeded: {} segments, {} words",
                        strategy.label(),
                        result.segments().len(),
                        result.word_count()
                    );
                    attempts.push(FetchAttempt::succeeded(strategy.label(), &result));
                    return Ok(Resolution {
                        result,
                        backend: strategy.backend,
                        attempts,
                    });
                }
                Err(TranscriptError::AsyncProcessingRequired(job_id)) => {
                    tracing::info!("Upstream started async job {}, stopping fallback", job_id);
                    return Err(TranscriptError::AsyncProcessingRequired(job_id));
                }
                Err(err) => {
                    tracing::warn!("Strategy {} failed ({}): {}", strategy.label(), err.kind(), err);
                    attempts.push(FetchAttempt::failed(strategy.label(), &err));
                }
            }
        }

        Err(TranscriptError::AllStrategiesExhausted(attempts))
    }

    async fn precheck(&self, reference: &VideoReference) -> Result<(), TranscriptError> {
        let (Some(probe), Platform::Youtube, Some(video_id)) =
            (&self.probe, reference.platform(), reference.video_id())
        else {
            return Ok(());
        };

        match probe.check(video_id).await {
            Availability::Unavailable => Err(TranscriptError::NotFound(
                "YouTube video is unavailable, private or restricted".to_string(),
            )),
            Availability::Available { title } => {
                tracing::debug!("Video available: {}", title.as_deref().unwrap_or("N/A"));
                Ok(())
            }
            Availability::Unknown => Ok(()),
        }
    }
}
