//! Service-layer query contract: `find_matches(seeker_id, options)`.

use std::sync::Arc;

use tracing::debug;

use soulsig_core::error::{CoreError, CoreResult};
use soulsig_core::traits::ProfileStore;
use soulsig_core::types::SubjectId;

use crate::options::MatchingOptions;
use crate::pipeline::{MatchingPipeline, SeekerView};
use crate::result::MatchingResult;

/// Resolves seeker ids against the profile store and runs the pipeline.
///
/// This is the surface the calling service layer talks to. It
/// distinguishes "no matches found" (valid empty result) from "matching
/// unavailable" (propagated `ConfigurationError`/`CompatibilityError`)
/// and "unknown seeker" (`ProfileNotFound`).
pub struct MatchingService<S: ProfileStore> {
    pipeline: Arc<MatchingPipeline>,
    store: Arc<S>,
}

impl<S: ProfileStore> MatchingService<S> {
    /// Create a service over a pipeline and a profile store.
    pub fn new(pipeline: Arc<MatchingPipeline>, store: Arc<S>) -> Self {
        Self { pipeline, store }
    }

    /// Find ranked matches for a stored seeker.
    ///
    /// # Errors
    ///
    /// - [`CoreError::ProfileNotFound`] for an unknown seeker id
    /// - everything [`MatchingPipeline::find_matches`] propagates
    pub async fn find_matches(
        &self,
        seeker_id: SubjectId,
        options: &MatchingOptions,
    ) -> CoreResult<MatchingResult> {
        let profile = self
            .store
            .load(seeker_id)
            .await?
            .ok_or(CoreError::ProfileNotFound { id: seeker_id })?;

        // Integrity gate: a stored signature that disagrees with the
        // stored point means scoring would run on incompatible data.
        if profile.signature != soulsig_core::codec::encode(&profile.point) {
            return Err(CoreError::CompatibilityError(format!(
                "subject {seeker_id} signature {} out of sync with its point",
                profile.signature
            )));
        }

        debug!(seeker = %seeker_id, signature = %profile.signature, "resolved seeker profile");
        self.pipeline.find_matches(&SeekerView::from(&profile), options)
    }
}
