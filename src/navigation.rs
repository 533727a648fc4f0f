//! Next/previous target resolution over the play queue.
//!
//! Pure functions over `(index, length, shuffle, loop)`; the player manager
//! owns the state and applies whatever target comes back.

use rand::{rngs::StdRng, RngExt};

/// Direction of travel for a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Where a next/previous request lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    /// Move the selection to this index and keep playing.
    Move(usize),
    /// End of travel: stop playback, selection unchanged.
    Stop,
}

/// Resolve the target of a navigation request.
///
/// In shuffle mode direction is meaningless: both directions draw a uniform
/// random index, resampled until it differs from the current one whenever
/// more than one song is queued (a single-song queue legitimately repeats
/// itself). Sequential forward travel wraps to the front only when loop is
/// on; backward travel never wraps regardless of loop.
pub fn resolve(
    direction: Direction,
    current_index: Option<usize>,
    queue_len: usize,
    is_shuffled: bool,
    is_looped: bool,
    rng: &mut StdRng,
) -> NavTarget {
    if queue_len == 0 {
        return NavTarget::Stop;
    }

    if is_shuffled {
        return NavTarget::Move(random_other_index(current_index, queue_len, rng));
    }

    match direction {
        Direction::Forward => {
            let next = current_index.map_or(0, |index| index + 1);
            if next < queue_len {
                NavTarget::Move(next)
            } else if is_looped {
                NavTarget::Move(0)
            } else {
                NavTarget::Stop
            }
        }
        Direction::Backward => match current_index {
            Some(index) if index > 0 => NavTarget::Move(index - 1),
            _ => NavTarget::Stop,
        },
    }
}

/// Uniform index over the queue, distinct from `current_index` whenever the
/// queue holds more than one song.
fn random_other_index(current_index: Option<usize>, queue_len: usize, rng: &mut StdRng) -> usize {
    loop {
        let candidate = rng.random_range(0..queue_len);
        if queue_len == 1 || Some(candidate) != current_index {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::from_seed([7u8; 32])
    }

    #[test]
    fn test_forward_advances_within_bounds() {
        let target = resolve(Direction::Forward, Some(0), 3, false, false, &mut rng());
        assert_eq!(target, NavTarget::Move(1));
    }

    #[test]
    fn test_forward_stops_at_end_without_loop() {
        let target = resolve(Direction::Forward, Some(2), 3, false, false, &mut rng());
        assert_eq!(target, NavTarget::Stop);
    }

    #[test]
    fn test_forward_wraps_at_end_with_loop() {
        let target = resolve(Direction::Forward, Some(2), 3, false, true, &mut rng());
        assert_eq!(target, NavTarget::Move(0));
    }

    #[test]
    fn test_forward_with_no_selection_starts_at_front() {
        let target = resolve(Direction::Forward, None, 3, false, false, &mut rng());
        assert_eq!(target, NavTarget::Move(0));
    }

    #[test]
    fn test_backward_steps_within_bounds() {
        let target = resolve(Direction::Backward, Some(2), 3, false, false, &mut rng());
        assert_eq!(target, NavTarget::Move(1));
    }

    #[test]
    fn test_backward_never_wraps_even_with_loop() {
        let target = resolve(Direction::Backward, Some(0), 3, false, true, &mut rng());
        assert_eq!(target, NavTarget::Stop);
    }

    #[test]
    fn test_backward_with_no_selection_stops() {
        let target = resolve(Direction::Backward, None, 3, false, true, &mut rng());
        assert_eq!(target, NavTarget::Stop);
    }

    #[test]
    fn test_empty_queue_always_stops() {
        assert_eq!(
            resolve(Direction::Forward, None, 0, true, true, &mut rng()),
            NavTarget::Stop
        );
        assert_eq!(
            resolve(Direction::Backward, None, 0, false, false, &mut rng()),
            NavTarget::Stop
        );
    }

    #[test]
    fn test_shuffled_never_repeats_current_index() {
        let mut rng = rng();
        let mut current = Some(2usize);
        for _ in 0..200 {
            match resolve(Direction::Forward, current, 5, true, false, &mut rng) {
                NavTarget::Move(index) => {
                    assert_ne!(Some(index), current);
                    current = Some(index);
                }
                NavTarget::Stop => panic!("shuffled navigation never stops on a non-empty queue"),
            }
        }
    }

    #[test]
    fn test_shuffled_ignores_direction() {
        let mut rng = rng();
        let mut current = Some(0usize);
        for _ in 0..200 {
            match resolve(Direction::Backward, current, 4, true, true, &mut rng) {
                NavTarget::Move(index) => {
                    assert_ne!(Some(index), current);
                    current = Some(index);
                }
                NavTarget::Stop => panic!("shuffled navigation never stops on a non-empty queue"),
            }
        }
    }

    #[test]
    fn test_shuffled_single_song_returns_same_index() {
        let mut rng = rng();
        for _ in 0..20 {
            assert_eq!(
                resolve(Direction::Forward, Some(0), 1, true, false, &mut rng),
                NavTarget::Move(0)
            );
        }
    }
}
