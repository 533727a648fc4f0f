//! Shuffle-order computation and order recovery.
//!
//! Both directions are pure: they take the present queue contents and return
//! a new order for [`crate::queue::PlayQueue::reorder`] to install.

use rand::{rngs::StdRng, seq::SliceRandom};

use crate::song::Song;

/// How the queue order is recovered when shuffle switches off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleRestore {
    /// Re-derive the order from the shuffled queue's own contents: each song
    /// is keyed by its current position, so the order comes back unchanged
    /// and only the current index is re-resolved. Default because hosts have
    /// shipped against this behavior.
    #[default]
    Derived,
    /// Reinstall the order captured at the moment shuffle switched on.
    Snapshot,
}

/// Queue order for entering shuffle: the current song first, the rest a
/// fresh unbiased permutation. With no selection the whole queue is
/// permuted and nothing is pinned.
pub fn shuffled_order(songs: &[Song], current_index: Option<usize>, rng: &mut StdRng) -> Vec<Song> {
    let mut order = Vec::with_capacity(songs.len());
    let mut rest = Vec::with_capacity(songs.len());
    for (index, song) in songs.iter().enumerate() {
        if Some(index) == current_index {
            order.push(song.clone());
        } else {
            rest.push(song.clone());
        }
    }
    rest.shuffle(rng);
    order.extend(rest);
    order
}

/// Queue order for leaving shuffle, per the configured restore strategy.
/// A missing snapshot falls back to the derived order.
pub fn restored_order(
    shuffled: &[Song],
    snapshot: Option<&[Song]>,
    restore: ShuffleRestore,
) -> Vec<Song> {
    match restore {
        ShuffleRestore::Snapshot => match snapshot {
            Some(original) => original.to_vec(),
            None => derived_order(shuffled),
        },
        ShuffleRestore::Derived => derived_order(shuffled),
    }
}

/// Stable re-sort of the queue keyed by each song's first position in the
/// queue itself. With unique ids this is the identity permutation.
fn derived_order(shuffled: &[Song]) -> Vec<Song> {
    let mut order = shuffled.to_vec();
    order.sort_by_key(|song| {
        shuffled
            .iter()
            .position(|other| other.id == song.id)
            .unwrap_or(usize::MAX)
    });
    order
}
