use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;

use super::domain::ApplicationId;
use super::repository::{ApplicationRepository, RepositoryError};

/// Number of distinct suffixes available within one prefix and year.
pub const SUFFIX_SPACE: u16 = 1000;

/// Prefix used when no override is configured.
pub const DEFAULT_ID_PREFIX: &str = "KR";

/// How many candidates to try before giving up on a crowded year.
pub const DEFAULT_MAX_ID_ATTEMPTS: u32 = 20;

/// Supplies raw suffix draws for identifier candidates. Implementations
/// must be safe to share across request handlers.
pub trait SuffixSource: Send + Sync {
    /// Returns a value in `0..SUFFIX_SPACE`.
    fn draw(&self) -> u16;
}

/// Uniform draws from the operating system entropy pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSuffixSource;

impl SuffixSource for RandomSuffixSource {
    fn draw(&self) -> u16 {
        rand::thread_rng().gen_range(0..SUFFIX_SPACE)
    }
}

/// Deterministic draws for demos and reproducible runs.
pub struct SeededSuffixSource {
    rng: Mutex<StdRng>,
}

impl SeededSuffixSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl SuffixSource for SeededSuffixSource {
    fn draw(&self) -> u16 {
        self.rng
            .lock()
            .expect("suffix rng mutex poisoned")
            .gen_range(0..SUFFIX_SPACE)
    }
}

#[derive(Debug, Error)]
pub enum IdentifierError {
    #[error("identifier space exhausted after {attempts} attempts")]
    SpaceExhausted { attempts: u32 },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Produces application identifiers of the form `PREFIX-YEAR-NNN`.
///
/// Candidate construction is a pure function of the year and a drawn
/// suffix; only [`generate`](Self::generate) consults the store, so the
/// format can be tested without any storage at all.
pub struct ApplicationIdGenerator {
    prefix: String,
    max_attempts: u32,
    suffixes: Box<dyn SuffixSource>,
}

impl ApplicationIdGenerator {
    pub fn new(prefix: impl Into<String>, max_attempts: u32, suffixes: Box<dyn SuffixSource>) -> Self {
        let prefix = prefix.into();
        let prefix = if prefix.trim().is_empty() {
            DEFAULT_ID_PREFIX.to_string()
        } else {
            prefix
        };
        Self {
            prefix,
            max_attempts: max_attempts.max(1),
            suffixes,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Formats one candidate identifier. Suffixes are folded into the
    /// `000..=999` range and zero-padded to three digits.
    pub fn candidate(&self, year: i32, suffix: u16) -> ApplicationId {
        ApplicationId(format!(
            "{}-{}-{:03}",
            self.prefix,
            year,
            suffix % SUFFIX_SPACE
        ))
    }

    /// Draws candidates until one is absent from the store, failing with
    /// [`IdentifierError::SpaceExhausted`] once the attempt budget is
    /// spent. Absence here is advisory; the store's insert remains the
    /// final uniqueness gate.
    pub fn generate<R>(&self, repository: &R, year: i32) -> Result<ApplicationId, IdentifierError>
    where
        R: ApplicationRepository + ?Sized,
    {
        for _ in 0..self.max_attempts {
            let candidate = self.candidate(year, self.suffixes.draw());
            if repository.fetch(&candidate)?.is_none() {
                return Ok(candidate);
            }
        }
        Err(IdentifierError::SpaceExhausted {
            attempts: self.max_attempts,
        })
    }
}

impl Default for ApplicationIdGenerator {
    fn default() -> Self {
        Self::new(
            DEFAULT_ID_PREFIX,
            DEFAULT_MAX_ID_ATTEMPTS,
            Box::new(RandomSuffixSource),
        )
    }
}

impl fmt::Debug for ApplicationIdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationIdGenerator")
            .field("prefix", &self.prefix)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}
