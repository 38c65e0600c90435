//! Queue navigation

use cadence_core::TrackId;

/// Track `offset` positions away from `current` in `queue`
///
/// `None` when `current` is unset, absent from the queue, or the shifted
/// index falls outside it.
pub fn shifted<'a>(
    queue: &'a [TrackId],
    current: Option<&TrackId>,
    offset: isize,
) -> Option<&'a TrackId> {
    let current = current?;
    let index = queue.iter().position(|id| id == current)?;
    queue.get(index.checked_add_signed(offset)?)
}
