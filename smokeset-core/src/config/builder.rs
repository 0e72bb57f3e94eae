// ============================================================================
// smokeset-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for ExtractionConfig
//
// Fluent construction of ExtractionConfig with defaults taken from the
// constants in config/mod.rs, optionally overridden by SMOKESET_SEED and
// SMOKESET_FRAMES.

use super::utils::{get_env_u64, get_env_usize};
use super::{
    DEFAULT_FRAMES_PER_STATE, DEFAULT_SEED, DEFAULT_STRATEGY, ENV_FRAMES, ENV_SEED,
    ExtractionConfig,
};
use crate::error::{CoreError, CoreResult};
use crate::sampling::Strategy;

/// Builder for creating ExtractionConfig instances.
#[derive(Debug, Clone)]
pub struct ExtractionConfigBuilder {
    strategy: Strategy,
    frames_per_state: usize,
    allow_duplicates: bool,
    seed: u64,
}

impl Default for ExtractionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionConfigBuilder {
    /// Creates a builder with library defaults and environment overrides applied.
    pub fn new() -> Self {
        Self {
            strategy: DEFAULT_STRATEGY,
            frames_per_state: get_env_usize(ENV_FRAMES, DEFAULT_FRAMES_PER_STATE),
            allow_duplicates: false,
            seed: get_env_u64(ENV_SEED, DEFAULT_SEED),
        }
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the strategy from its name ("random" or "evenly").
    pub fn strategy_name(mut self, name: &str) -> CoreResult<Self> {
        self.strategy = name.parse()?;
        Ok(self)
    }

    pub fn frames_per_state(mut self, count: usize) -> Self {
        self.frames_per_state = count;
        self
    }

    pub fn allow_duplicates(mut self, allow: bool) -> Self {
        self.allow_duplicates = allow;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> CoreResult<ExtractionConfig> {
        if self.frames_per_state == 0 {
            return Err(CoreError::Configuration(
                "At least one frame per state must be requested".to_string(),
            ));
        }

        Ok(ExtractionConfig {
            strategy: self.strategy,
            frames_per_state: self.frames_per_state,
            allow_duplicates: self.allow_duplicates,
            seed: self.seed,
        })
    }
}
