//! # Admission policy
//!
//! Every request gets its own [`AdmissionPolicy`], derived from the batch size
//! and the process-wide [`DispatchConfig`]:
//!
//! - `max_concurrent`: translation calls allowed in flight at once.
//! - `min_inter_service_gap`: minimum spacing between two call starts.
//! - `queue_ceiling`: largest cohort (pending plus in-flight tasks) admitted.
//! - `drop_on_ceiling_exceeded`: reject a cohort over the ceiling instead of
//!   queueing it.
//!
//! ## Ceiling modes
//! - `Derived { floor }`: `max(max_concurrent, floor, batch_size - max_concurrent)`.
//! - `Fixed(n)`: `n`, independent of the batch.
//!
//! The `batch_size - max_concurrent` term is always below the batch size, so it
//! never makes a batch admissible. With `floor >= max_concurrent` the derived
//! ceiling admits exactly the batches of at most `floor` tasks: the default
//! `Derived { floor: 500 }` accepts the same batches as `Fixed(500)`. What the
//! derived mode changes is the ceiling reported in `Overloaded` errors and logs.

use crate::error::{RelayError, RelayResult};
use std::time::Duration;

pub const DEFAULT_MAX_CONCURRENT: usize = 15;
pub const DEFAULT_MIN_GAP: Duration = Duration::from_millis(6);
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_CEILING_FLOOR: usize = 500;

/// How the queue ceiling of a batch is chosen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CeilingMode {
    /// Grow with the batch beyond the concurrency window, never below `floor`.
    /// Admits the same batches as `Fixed(floor.max(max_concurrent))`.
    Derived { floor: usize },
    /// Same ceiling for every batch
    Fixed(usize),
}

impl Default for CeilingMode {
    fn default() -> Self {
        CeilingMode::Derived {
            floor: DEFAULT_CEILING_FLOOR,
        }
    }
}

/// Process-wide dispatch settings, fixed at startup
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    pub max_concurrent: usize,
    pub min_inter_service_gap: Duration,
    /// Backstop timeout the dispatcher puts around every call
    pub call_timeout: Duration,
    pub ceiling: CeilingMode,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            min_inter_service_gap: DEFAULT_MIN_GAP,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            ceiling: CeilingMode::default(),
        }
    }
}

impl DispatchConfig {
    /// Read settings from the environment, falling back to defaults
    ///
    /// - `RELAY_MAX_CONCURRENT`
    /// - `RELAY_MIN_GAP_MS`
    /// - `RELAY_CALL_TIMEOUT_MS`
    /// - `RELAY_QUEUE_CEILING`: `derived` or a fixed number
    /// - `RELAY_CEILING_FLOOR`: floor of the derived ceiling
    pub fn from_env() -> RelayResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> RelayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_concurrent = parse_var(&lookup, "RELAY_MAX_CONCURRENT")?
            .unwrap_or(defaults.max_concurrent);
        if max_concurrent == 0 {
            return Err(RelayError::ConfigError(
                "RELAY_MAX_CONCURRENT must be at least 1".to_string(),
            ));
        }

        let min_inter_service_gap = parse_var(&lookup, "RELAY_MIN_GAP_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.min_inter_service_gap);

        let call_timeout = parse_var(&lookup, "RELAY_CALL_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.call_timeout);
        if call_timeout.is_zero() {
            return Err(RelayError::ConfigError(
                "RELAY_CALL_TIMEOUT_MS must be positive".to_string(),
            ));
        }

        let ceiling = match lookup("RELAY_QUEUE_CEILING").as_deref().map(str::trim) {
            None | Some("") | Some("derived") => CeilingMode::Derived {
                floor: parse_var(&lookup, "RELAY_CEILING_FLOOR")?
                    .unwrap_or(DEFAULT_CEILING_FLOOR),
            },
            Some(value) => CeilingMode::Fixed(value.parse().map_err(|_| {
                RelayError::ConfigError(format!(
                    "RELAY_QUEUE_CEILING must be 'derived' or a number, got '{}'",
                    value
                ))
            })?),
        };

        Ok(Self {
            max_concurrent,
            min_inter_service_gap,
            call_timeout,
            ceiling,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> RelayResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value.trim().parse().map(Some).map_err(|_| {
            RelayError::ConfigError(format!("{} has an invalid value: '{}'", key, value))
        }),
    }
}

/// Admission rules for one dispatch batch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdmissionPolicy {
    pub max_concurrent: usize,
    pub min_inter_service_gap: Duration,
    pub queue_ceiling: usize,
    pub drop_on_ceiling_exceeded: bool,
}

impl AdmissionPolicy {
    /// A caller-supplied policy. `max_concurrent` is clamped to at least 1.
    pub fn new(
        max_concurrent: usize,
        min_inter_service_gap: Duration,
        queue_ceiling: usize,
        drop_on_ceiling_exceeded: bool,
    ) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            min_inter_service_gap,
            queue_ceiling,
            drop_on_ceiling_exceeded,
        }
    }

    /// Derive the policy for a batch of `batch_size` tasks
    pub fn for_batch(batch_size: usize, config: &DispatchConfig) -> Self {
        let max_concurrent = config.max_concurrent.max(1);
        let queue_ceiling = match config.ceiling {
            CeilingMode::Derived { floor } => max_concurrent
                .max(floor)
                .max(batch_size.saturating_sub(max_concurrent)),
            CeilingMode::Fixed(ceiling) => ceiling,
        };
        Self::new(
            max_concurrent,
            config.min_inter_service_gap,
            queue_ceiling,
            true,
        )
    }

    /// Whether a cohort of `cohort_size` tasks may be dispatched
    pub fn admits(&self, cohort_size: usize) -> bool {
        !self.drop_on_ceiling_exceeded || cohort_size <= self.queue_ceiling
    }
}
