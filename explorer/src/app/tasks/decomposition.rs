//! # Decomposition Task
//!
//! One round trip through the shared [`DecompositionChannel`].

use async_channel::Sender;
use shared::dto::trends::TermSeries;
use tokio::spawn;
use tracing::debug;

use crate::app::events::ExploreEvent;
use crate::services::decomposition::DecompositionChannel;

/// Decompose the raw series of the term at `index`.
///
/// The channel bounds the round trip with its own timeout.
pub(crate) fn request_decomposition(
    channel: DecompositionChannel,
    raw: TermSeries,
    index: usize,
    generation: u64,
    event_tx: Sender<ExploreEvent>,
) {
    spawn(async move {
        let result = channel.request_decomposition(&raw).await;
        debug!(generation, index, term = %raw.term, ok = result.is_ok(), "Decomposition finished");

        if event_tx
            .send(ExploreEvent::DecompositionResult {
                generation,
                index,
                result,
            })
            .await
            .is_err()
        {
            debug!(generation, index, "Event channel closed, dropping decomposition result");
        }
    });
}
