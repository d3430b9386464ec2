//! Order skewing for table layout.
//!
//! This is a heuristic. It widens the window a swap partner is drawn from as the
//! target grows and mixes in uniform jitter, but it never computes or checks an
//! expected return. The result is always a permutation of the input.

use crate::RngState;

/// Probability that a step ignores the bias window and draws from the whole prefix.
pub const SHUFFLE_JITTER: f64 = 0.25;

/// Width of the swap window for position `i` under `target_rtp` (percent).
pub fn bias_range(i: usize, target_rtp: f64) -> usize {
    if i == 0 {
        return 0;
    }
    let t = (target_rtp / 100.0).clamp(0.0, 1.0);
    let lerp = 1.0 + (i as f64 - 1.0) * t;
    (lerp.round() as usize).clamp(1, i)
}

pub fn biased_shuffle<T>(items: &mut [T], target_rtp: f64, rng: &mut RngState) {
    if items.len() < 2 {
        return;
    }
    for i in (1..items.len()).rev() {
        let range = bias_range(i, target_rtp);
        let mut j = rng.range_inclusive(i.saturating_sub(range), i);
        if rng.chance(SHUFFLE_JITTER) {
            j = rng.range_inclusive(0, i);
        }
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! range_case {
        ($name:ident, $i:expr, $rtp:expr, $expected:expr) => {
            #[test]
            fn $name() {
                assert_eq!(bias_range($i, $rtp), $expected);
            }
        };
    }

    range_case!(range_zero_rtp_is_one, 10, 0.0, 1);
    range_case!(range_full_rtp_is_i, 10, 100.0, 10);
    range_case!(range_half_rtp_rounds, 10, 50.0, 6);
    range_case!(range_first_swap_is_one, 1, 100.0, 1);
    range_case!(range_out_of_bounds_rtp_clamped, 10, 250.0, 10);

    fn assert_permutation(rtp: f64, seed: u64, len: usize) {
        let mut items: Vec<usize> = (0..len).collect();
        let mut rng = RngState::from_seed(seed);
        biased_shuffle(&mut items, rtp, &mut rng);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..len).collect::<Vec<_>>(), "rtp {rtp} seed {seed}");
    }

    #[test]
    fn output_is_permutation_for_any_target() {
        for rtp in [0.0, 12.5, 50.0, 70.0, 99.9, 100.0] {
            for seed in 0..8 {
                assert_permutation(rtp, seed, 54);
            }
        }
    }

    #[test]
    fn tiny_inputs_are_untouched() {
        let mut empty: Vec<u8> = Vec::new();
        let mut one = vec![9u8];
        let mut rng = RngState::from_seed(1);
        biased_shuffle(&mut empty, 70.0, &mut rng);
        biased_shuffle(&mut one, 70.0, &mut rng);
        assert!(empty.is_empty());
        assert_eq!(one, vec![9]);
    }

    #[test]
    fn same_seed_same_order() {
        let mut a: Vec<usize> = (0..30).collect();
        let mut b = a.clone();
        biased_shuffle(&mut a, 40.0, &mut RngState::from_seed(77));
        biased_shuffle(&mut b, 40.0, &mut RngState::from_seed(77));
        assert_eq!(a, b);
    }
}
