/// Lead lookup pipeline shared by the HTTP handlers and the CLI.
///
/// 1. Fetch the lead record from Transunion
/// 2. Normalize it into flat features
/// 3. Stamp the result with an event time
use crate::errors::{AppError, ResultExt};
use crate::models::{LeadFeaturesResponse, LeadQuery, LeadRecord};
use crate::normalizer::{warn_collisions, Normalizer};
use crate::transunion_client::TransunionClient;
use chrono::Utc;

/// Normalizes a record that is already in hand.
///
/// `None` means the provider had no match and yields an empty, unmatched result.
pub fn build_features(
    normalizer: &Normalizer,
    record: Option<&LeadRecord>,
) -> Result<LeadFeaturesResponse, AppError> {
    let features = normalizer.extract(record)?;
    warn_collisions(&features);
    let overridden_features = features.collisions();

    Ok(LeadFeaturesResponse {
        matched: record.is_some(),
        features: features.into_map(),
        overridden_features,
        event_time: Utc::now(),
    })
}

/// Fetches and normalizes one lead.
pub async fn lookup_features(
    client: &TransunionClient,
    normalizer: &Normalizer,
    query: &LeadQuery,
) -> Result<LeadFeaturesResponse, AppError> {
    let record = client
        .fetch(query)
        .await
        .context("Transunion lead lookup failed")?;

    let response = build_features(normalizer, record.as_ref()).with_context(|| {
        format!(
            "Failed to normalize Transunion lead for params {:?}",
            query.keys()
        )
    })?;

    tracing::info!(
        "Lead lookup complete. Matched: {}, features: {}",
        response.matched,
        response.features.len()
    );

    Ok(response)
}
