//! Recombination operators.
//!
//! Each operator takes exactly one parent tour and returns a new child tour
//! whose genes are a rearrangement of the parent's. Neither operator can drop
//! or duplicate a city; [`Tour::offspring`] enforces this on every child.

use super::tour::{CityId, Genome, Tour};
use crate::cities::MIN_CITIES;
use log::debug;
use rand::Rng;
use std::ops::RangeInclusive;

/// The two ways a child can be derived from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recombination {
    /// Reverse one contiguous run of genes.
    Reversal,
    /// Exchange two disjoint, equally long runs of genes.
    Relocation,
}

impl Recombination {
    /// Picks `Reversal` with probability `reversal_probability`, else `Relocation`.
    pub fn choose<R: Rng + ?Sized>(reversal_probability: f64, rng: &mut R) -> Self {
        if rng.random::<f64>() < reversal_probability {
            Recombination::Reversal
        } else {
            Recombination::Relocation
        }
    }

    pub fn apply<R: Rng + ?Sized>(self, parent: &Tour, rng: &mut R) -> Tour {
        match self {
            Recombination::Reversal => segment_reversal(parent, rng),
            Recombination::Relocation => segment_relocation(parent, rng),
        }
    }
}

/// Picks an operator and produces one child of `parent`.
pub fn recombine<R: Rng + ?Sized>(parent: &Tour, reversal_probability: f64, rng: &mut R) -> Tour {
    Recombination::choose(reversal_probability, rng).apply(parent, rng)
}

/// Reverses a random run `[start, end]` of the parent's genes.
///
/// `start` is uniform in `[0, N-2]`, then `end` uniform in `[start, N-1]`.
/// `start == end` is allowed and yields a copy of the parent.
///
/// # Panics
/// Panics if the parent has fewer than two genes.
pub fn segment_reversal<R: Rng + ?Sized>(parent: &Tour, rng: &mut R) -> Tour {
    let n = parent.len();
    assert!(n >= 2, "segment reversal needs at least 2 genes, got {}", n);

    let start = rng.random_range(0..n - 1);
    let end = rng.random_range(start..n);
    debug!("reversal of genes {}..={}", start, end);

    Tour::offspring(parent, reverse_segment(parent.genes(), start..=end))
}

/// Swaps two random, disjoint runs of equal length (at least two genes each).
///
/// Index selection is closed-form, so it always terminates:
/// * `start_a` uniform in `[0, N-4]`,
/// * run length `len` uniform in `[2, (N - start_a) / 2]`, which leaves room
///   for a second run of `len` genes after the first,
/// * `start_b` uniform in `[start_a + len, N - len]`.
///
/// # Panics
/// Panics if the parent has fewer than [`MIN_CITIES`] genes.
pub fn segment_relocation<R: Rng + ?Sized>(parent: &Tour, rng: &mut R) -> Tour {
    let n = parent.len();
    assert!(
        n >= MIN_CITIES,
        "segment relocation needs at least {} genes, got {}",
        MIN_CITIES,
        n
    );

    let start_a = rng.random_range(0..=n - MIN_CITIES);
    let len = rng.random_range(2..=(n - start_a) / 2);
    let start_b = rng.random_range(start_a + len..=n - len);
    let a = start_a..=start_a + len - 1;
    let b = start_b..=start_b + len - 1;
    debug!("relocation of genes {:?} <-> {:?}", a, b);

    Tour::offspring(parent, swap_segments(parent.genes(), a, b))
}

/// Copy of `genes` with the run `range` reversed in place.
pub fn reverse_segment(genes: &[CityId], range: RangeInclusive<usize>) -> Genome {
    let mut child = genes.to_vec();
    child[range].reverse();
    child
}

/// Copy of `genes` with the runs `a` and `b` exchanged.
///
/// The child is laid out as: genes before `a`, run `b`, genes strictly
/// between the runs, run `a`, genes after `b`. `a` must end before `b` starts.
pub fn swap_segments(
    genes: &[CityId],
    a: RangeInclusive<usize>,
    b: RangeInclusive<usize>,
) -> Genome {
    let (start_a, end_a) = (*a.start(), *a.end());
    let (start_b, end_b) = (*b.start(), *b.end());
    debug_assert!(start_a <= end_a && end_a < start_b && start_b <= end_b);

    let mut child = Vec::with_capacity(genes.len());
    child.extend_from_slice(&genes[..start_a]);
    child.extend_from_slice(&genes[start_b..=end_b]);
    child.extend_from_slice(&genes[end_a + 1..start_b]);
    child.extend_from_slice(&genes[start_a..=end_a]);
    child.extend_from_slice(&genes[end_b + 1..]);
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::CityTable;
    use crate::evolution::tour::is_permutation_of;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn random_parent(n: usize, rng: &mut StdRng) -> Tour {
        let coordinates: Vec<(f64, f64)> = (0..n).map(|i| (i as f64, (i * i) as f64)).collect();
        let cities = CityTable::new(&coordinates).unwrap();
        Tour::random(&cities, rng)
    }

    #[test]
    fn test_reversal_always_yields_permutation() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in [4, 5, 6, 9, 14, 50] {
            for _ in 0..500 {
                let parent = random_parent(n, &mut rng);
                let child = segment_reversal(&parent, &mut rng);
                assert_eq!(child.len(), parent.len());
                assert!(is_permutation_of(parent.genes(), child.genes()));
            }
        }
    }

    #[test]
    fn test_relocation_always_yields_permutation() {
        let mut rng = StdRng::seed_from_u64(43);
        for n in [4, 5, 6, 7, 14, 50] {
            for _ in 0..500 {
                let parent = random_parent(n, &mut rng);
                let child = segment_relocation(&parent, &mut rng);
                assert_eq!(child.len(), parent.len());
                assert!(is_permutation_of(parent.genes(), child.genes()));
            }
        }
    }

    #[test]
    fn test_relocation_on_minimum_size_swaps_halves() {
        let mut rng = StdRng::seed_from_u64(44);
        let parent = Tour::from_genes(vec![1, 2, 3, 4]);
        for _ in 0..50 {
            let child = segment_relocation(&parent, &mut rng);
            assert_eq!(child.genes(), &[3, 4, 1, 2]);
        }
    }

    #[test]
    fn test_relocation_changes_the_tour() {
        // two disjoint runs of distinct ids can never swap into the same order
        let mut rng = StdRng::seed_from_u64(45);
        for _ in 0..300 {
            let parent = random_parent(12, &mut rng);
            let child = segment_relocation(&parent, &mut rng);
            assert_ne!(child, parent);
        }
    }

    #[test]
    fn test_chained_recombination_keeps_permutation() {
        let mut rng = StdRng::seed_from_u64(46);
        let mut tour = random_parent(20, &mut rng);
        let original = tour.genes().to_vec();
        for _ in 0..1000 {
            tour = recombine(&tour, 0.5, &mut rng);
        }
        assert!(is_permutation_of(&original, tour.genes()));
    }

    #[test]
    fn test_reverse_segment_of_length_one_is_identity() {
        let genes = vec![5, 3, 1, 2, 4];
        for i in 0..genes.len() {
            assert_eq!(reverse_segment(&genes, i..=i), genes);
        }
    }

    #[test]
    fn test_reverse_segment_only_touches_range() {
        assert_eq!(reverse_segment(&[1, 2, 3, 4, 5], 1..=3), vec![1, 4, 3, 2, 5]);
        assert_eq!(reverse_segment(&[1, 2, 3, 4, 5], 0..=4), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_swap_segments_layout() {
        let genes = vec![15, 1, 2, 3, 10, 7, 8];
        // gap between the runs stays in place
        assert_eq!(swap_segments(&genes, 0..=1, 3..=4), vec![3, 10, 2, 15, 1, 7, 8]);
        // adjacent runs
        assert_eq!(swap_segments(&genes, 1..=2, 3..=4), vec![15, 3, 10, 1, 2, 7, 8]);
    }

    #[test]
    fn test_choose_respects_extreme_probabilities() {
        let mut rng = StdRng::seed_from_u64(47);
        for _ in 0..100 {
            assert_eq!(Recombination::choose(1.0, &mut rng), Recombination::Reversal);
            assert_eq!(Recombination::choose(0.0, &mut rng), Recombination::Relocation);
        }
    }

    #[test]
    fn test_choose_is_roughly_even_by_default() {
        let mut rng = StdRng::seed_from_u64(48);
        let reversals = (0..10_000)
            .filter(|_| Recombination::choose(0.5, &mut rng) == Recombination::Reversal)
            .count();
        assert!((4_500..=5_500).contains(&reversals));
    }
}
