//! Gap analysis over a document's domain chunks
//!
//! Every chunk becomes one or more jobs: one per subdomain when the chunk
//! names several, otherwise a single job labelled with its only subdomain
//! (or the domain itself when it names none). Jobs run on the blocking pool,
//! at most `max_concurrent_syntheses` at a time, each under its own timeout.
//! A job that fails becomes that subdomain's error outcome; the report is
//! always assembled in chunk order.

use crate::config::{RetrievalMode, SynthesizerConfig};
use crate::error::SynthesizerError;
use crate::gap::GapSynthesizer;
use crate::retriever::Retriever;
use crate::types::{DomainAnalysis, GapOutcome, GapReport};
use gapscope_domain::traits::{EmbeddingModel, LlmProvider, ReferenceIndex};
use gapscope_domain::{DomainChunk, ReferenceFilter};
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// What a job's retrieval is restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Subdomain,
    Domain,
}

#[derive(Debug, Clone)]
struct Job {
    domain: String,
    subdomain: String,
    text: String,
    scope: Scope,
}

enum Layout {
    Single(usize),
    Subdomains(Vec<usize>),
}

/// Runs retrieval and gap synthesis for domain chunks
pub struct Analyzer<L, I, E> {
    synthesizer: Arc<GapSynthesizer<L>>,
    retriever: Retriever<I, E>,
    config: SynthesizerConfig,
}

impl<L, I, E> Clone for Analyzer<L, I, E> {
    fn clone(&self) -> Self {
        Self {
            synthesizer: Arc::clone(&self.synthesizer),
            retriever: self.retriever.clone(),
            config: self.config.clone(),
        }
    }
}

impl<L, I, E> Analyzer<L, I, E>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
    I: ReferenceIndex + Send + Sync + 'static,
    I::Error: Display,
    E: EmbeddingModel + Send + Sync + 'static,
    E::Error: Display,
{
    /// Create an analyzer, validating `config`
    pub fn new(
        synthesizer: GapSynthesizer<L>,
        retriever: Retriever<I, E>,
        config: SynthesizerConfig,
    ) -> Result<Self, SynthesizerError> {
        config.validate().map_err(SynthesizerError::Config)?;
        Ok(Self {
            synthesizer: Arc::new(synthesizer),
            retriever,
            config,
        })
    }

    /// Get the analyzer configuration
    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Retrieve references for `subdomain` and synthesize, blocking
    pub fn analyze_subdomain(
        &self,
        domain: &str,
        subdomain: &str,
        text: &str,
    ) -> Result<GapOutcome, SynthesizerError> {
        self.run(&Job {
            domain: domain.to_string(),
            subdomain: subdomain.to_string(),
            text: text.to_string(),
            scope: Scope::Subdomain,
        })
    }

    /// Analyze every non-blank chunk
    ///
    /// Never fails as a whole: each job's error is reported in place.
    pub async fn analyze_chunks(&self, chunks: &[DomainChunk]) -> GapReport {
        let mut jobs = Vec::new();
        let mut layout = Vec::new();

        for chunk in chunks {
            if chunk.is_blank() {
                warn!("Skipping blank chunk for {}", chunk.domain);
                continue;
            }
            let job = |subdomain: &str| Job {
                domain: chunk.domain.clone(),
                subdomain: subdomain.to_string(),
                text: chunk.text.clone(),
                scope: Scope::Subdomain,
            };

            let entry = match chunk.subdomains.as_slice() {
                [] => {
                    jobs.push(job(&chunk.domain));
                    Layout::Single(jobs.len() - 1)
                }
                [only] => {
                    jobs.push(job(only));
                    Layout::Single(jobs.len() - 1)
                }
                many => Layout::Subdomains(
                    many.iter()
                        .map(|subdomain| {
                            jobs.push(job(subdomain));
                            jobs.len() - 1
                        })
                        .collect(),
                ),
            };
            layout.push((chunk.domain.clone(), entry));
        }

        info!(
            "Analyzing {} domain chunks with {} syntheses",
            layout.len(),
            jobs.len()
        );

        let mut outcomes = self.run_all(&jobs).await;
        let mut take = |slot: usize| {
            outcomes[slot].take().unwrap_or_else(|| {
                let job = &jobs[slot];
                GapOutcome::failed(&job.domain, &job.subdomain, "synthesis task aborted", None)
            })
        };

        let mut report = GapReport::new();
        for (domain, entry) in layout {
            let analysis = match entry {
                Layout::Single(slot) => DomainAnalysis::Single(take(slot)),
                Layout::Subdomains(slots) => DomainAnalysis::Subdomains {
                    subdomains_analysis: slots.into_iter().map(&mut take).collect(),
                },
            };
            report.push(domain, analysis);
        }
        report
    }

    /// Analyze `text` as a whole for `domain`
    ///
    /// The domain doubles as the subdomain label. Semantic retrieval is
    /// unfiltered; exact retrieval filters on the domain.
    pub async fn analyze_domain(&self, domain: &str, text: &str) -> Result<GapOutcome, SynthesizerError> {
        if domain.trim().is_empty() {
            return Err(SynthesizerError::MissingField("domain"));
        }
        if text.trim().is_empty() {
            return Err(SynthesizerError::EmptyInput);
        }

        self.run_blocking(Job {
            domain: domain.to_string(),
            subdomain: domain.to_string(),
            text: text.to_string(),
            scope: Scope::Domain,
        })
        .await
    }

    async fn run_all(&self, jobs: &[Job]) -> Vec<Option<GapOutcome>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_syntheses));
        let mut set = JoinSet::new();

        for (slot, job) in jobs.iter().cloned().enumerate() {
            let analyzer = self.clone();
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = match analyzer.run_blocking(job.clone()).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!("Gap analysis for {} / {} failed: {}", job.domain, job.subdomain, e);
                        GapOutcome::failed(job.domain, job.subdomain, e.to_string(), None)
                    }
                };
                (slot, outcome)
            });
        }

        let mut outcomes = vec![None; jobs.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((slot, outcome)) => outcomes[slot] = Some(outcome),
                Err(e) => warn!("Synthesis task aborted: {}", e),
            }
        }
        outcomes
    }

    async fn run_blocking(&self, job: Job) -> Result<GapOutcome, SynthesizerError> {
        let analyzer = self.clone();
        let handle = tokio::task::spawn_blocking(move || analyzer.run(&job));

        match tokio::time::timeout(self.config.synthesis_timeout(), handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(SynthesizerError::Task(e.to_string())),
            Err(_) => Err(SynthesizerError::Timeout(self.config.synthesis_timeout_secs)),
        }
    }

    fn run(&self, job: &Job) -> Result<GapOutcome, SynthesizerError> {
        let top_k = self.config.top_k;
        let references = match (self.config.retrieval_mode, job.scope) {
            (RetrievalMode::Semantic, Scope::Subdomain) => {
                self.retriever.fetch_similar(&job.text, Some(&job.subdomain), top_k)?
            }
            (RetrievalMode::Semantic, Scope::Domain) => {
                self.retriever.fetch_similar(&job.text, None, top_k)?
            }
            (RetrievalMode::Exact, Scope::Subdomain) => {
                self.retriever.fetch_by_subdomain(&job.subdomain, None, top_k)?
            }
            (RetrievalMode::Exact, Scope::Domain) => {
                let filter = ReferenceFilter {
                    domain: Some(job.domain.clone()),
                    subdomain: None,
                };
                self.retriever.fetch_by_filter(&filter, top_k)?
            }
        };

        self.synthesizer
            .synthesize(&job.domain, &job.subdomain, &job.text, &references)
    }
}
