use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::tracking::error::{Result, TrackingError};
use crate::tracking::generator::{CodeGenerator, is_valid_code};
use crate::tracking::store::CodeStore;

/// Generates candidates and reserves them until one is accepted by the store.
#[derive(Clone)]
pub struct Issuer {
    store: Arc<dyn CodeStore>,
    max_attempts: NonZeroU32,
}

impl Issuer {
    pub fn new(store: Arc<dyn CodeStore>, max_attempts: NonZeroU32) -> Self {
        Self {
            store,
            max_attempts,
        }
    }

    pub fn store(&self) -> &dyn CodeStore {
        self.store.as_ref()
    }

    /// Issues a new tracking number for the given attributes.
    ///
    /// Blocks on the store; call from a blocking context.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::RetriesExhausted`] if every attempt collided
    /// with an already issued code, or [`TrackingError::Store`] if the store
    /// fails.
    pub fn issue<'a>(&self, attributes: impl IntoIterator<Item = &'a str>) -> Result<String> {
        let generator = CodeGenerator::new(attributes);
        let mut rng = StdRng::from_entropy();

        for attempt in 1..=self.max_attempts.get() {
            let candidate = generator.candidate(&mut rng);
            debug_assert!(is_valid_code(&candidate));

            if self.store.try_reserve(&candidate, Utc::now())? {
                tracing::debug!(tracking_number = %candidate, attempt, "reserved tracking number");
                return Ok(candidate);
            }
            tracing::debug!(
                tracking_number = %candidate,
                attempt,
                "tracking number already issued"
            );
        }

        tracing::warn!(
            prefix = generator.prefix(),
            attempts = self.max_attempts.get(),
            "could not reserve a tracking number"
        );
        Err(TrackingError::RetriesExhausted {
            attempts: self.max_attempts.get(),
        })
    }
}
