use rand::seq::SliceRandom;
use rand::Rng;

/// Unbiased Fisher-Yates shuffle into a new vector; the input is left alone.
///
/// `SliceRandom::shuffle` walks from the last index down to 1 and swaps each
/// slot with a uniform index in `[0, i]`.
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}

/// Remove and return one of the first `window` items, chosen uniformly.
/// Biases picks toward the front of an already-ranked pool.
pub fn pick_from_window<T, R: Rng + ?Sized>(
    pool: &mut Vec<T>,
    window: usize,
    rng: &mut R,
) -> Option<T> {
    if pool.is_empty() {
        return None;
    }

    let span = window.max(1).min(pool.len());
    let index = rng.gen_range(0..span);
    Some(pool.remove(index))
}
