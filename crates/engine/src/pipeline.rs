//! # Recommendation Pipeline
//!
//! Runs the two passes over a fully loaded store, in order:
//! 1. Compatibility pass (writes every user's compatibility map)
//! 2. Recommendation pass (reads those maps, writes every user's list)
//!
//! Ingestion must be finished before `run` is called; the store is borrowed
//! mutably for the whole run, so nothing else can touch it meanwhile.

use std::time::{Duration, Instant};

use data_loader::EntityStore;
use tracing::info;

use crate::compatibility::{CompatibilityEngine, CompatibilitySummary};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::recommend::{RecommendationEngine, RecommendationSummary};

/// What a full run did and how long each pass took
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSummary {
    pub compatibility: CompatibilitySummary,
    pub recommendation: RecommendationSummary,
    pub compatibility_elapsed: Duration,
    pub recommendation_elapsed: Duration,
}

/// Both engine passes, built from one validated config
#[derive(Debug, Clone, Copy)]
pub struct RecommendationPipeline {
    compatibility: CompatibilityEngine,
    recommendation: RecommendationEngine,
}

impl RecommendationPipeline {
    /// Build both engines. Fails before touching any user if the config is
    /// invalid.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Ok(Self {
            compatibility: CompatibilityEngine::new(&config)?,
            recommendation: RecommendationEngine::new(config)?,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        self.recommendation.config()
    }

    pub fn recommendation_engine(&self) -> &RecommendationEngine {
        &self.recommendation
    }

    /// Run the compatibility pass, then the recommendation pass
    pub fn run(&self, store: &mut EntityStore) -> Result<PipelineSummary> {
        let start = Instant::now();
        let compatibility = self.compatibility.run(store)?;
        let compatibility_elapsed = start.elapsed();
        info!("Compatibility pass finished in {:?}", compatibility_elapsed);

        let start = Instant::now();
        let recommendation = self.recommendation.run(store)?;
        let recommendation_elapsed = start.elapsed();
        info!("Recommendation pass finished in {:?}", recommendation_elapsed);

        Ok(PipelineSummary {
            compatibility,
            recommendation,
            compatibility_elapsed,
            recommendation_elapsed,
        })
    }
}
