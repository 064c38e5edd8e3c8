use crate::cities::CityTable;
use rand::Rng;
use rand::seq::SliceRandom;
use std::sync::OnceLock;

/// Identifier of a city, `1..=N`.
pub type CityId = usize;

/// Alias within crate for a route: an ordering of every city id.
pub type Genome = Vec<CityId>;

/// A candidate route through every city of a `CityTable`.
///
/// The genes never change once the tour exists; offspring are always new
/// tours. The fitness (open path length) is computed on first request and
/// cached for the lifetime of the tour.
#[derive(Debug, Clone)]
pub struct Tour {
    genes: Genome,
    fitness: OnceLock<f64>,
}

impl Tour {
    /// Creates a tour visiting the cities in a uniformly random order.
    pub fn random<R: Rng + ?Sized>(cities: &CityTable, rng: &mut R) -> Self {
        let mut genes: Genome = cities.ids().collect();
        genes.shuffle(rng);
        Self::from_genes(genes)
    }

    /// Wraps an existing ordering. The caller is responsible for `genes`
    /// being a permutation of the table's ids.
    pub fn from_genes(genes: Genome) -> Self {
        Self {
            genes,
            fitness: OnceLock::new(),
        }
    }

    /// Builds a child of `parent` from recombined genes.
    ///
    /// # Panics
    /// Panics when `genes` is not a permutation of the parent's genes. A
    /// recombination operator that drops or duplicates a city is broken, and
    /// no run can continue meaningfully from there.
    pub fn offspring(parent: &Tour, genes: Genome) -> Self {
        assert!(
            is_permutation_of(&parent.genes, &genes),
            "permutation invariant violated: parent {:?} produced child {:?}",
            parent.genes,
            genes
        );
        Self::from_genes(genes)
    }

    pub fn genes(&self) -> &[CityId] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Total length of the open path through the genes, in order.
    ///
    /// Only meaningful against the table the tour was built from. The first
    /// call computes and caches the value; later calls return the cache.
    pub fn fitness(&self, cities: &CityTable) -> f64 {
        *self.fitness.get_or_init(|| cities.path_length(&self.genes))
    }

    /// Cached fitness, if it has already been computed.
    pub fn cached_fitness(&self) -> Option<f64> {
        self.fitness.get().copied()
    }
}

impl PartialEq for Tour {
    fn eq(&self, other: &Self) -> bool {
        self.genes == other.genes
    }
}

impl Eq for Tour {}

/// True when `child` holds exactly the same ids as `parent`, each once.
///
/// Ids are assumed to be drawn from `1..=parent.len()`.
pub fn is_permutation_of(parent: &[CityId], child: &[CityId]) -> bool {
    if parent.len() != child.len() {
        return false;
    }
    let n = parent.len();
    let mut seen = vec![0i32; n + 1];
    for &id in parent {
        if id == 0 || id > n {
            return false;
        }
        seen[id] += 1;
    }
    for &id in child {
        if id == 0 || id > n {
            return false;
        }
        seen[id] -= 1;
    }
    seen.iter().all(|&count| count == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn get_test_cities() -> CityTable {
        CityTable::new(&[
            (1.0, 7.0),
            (2.0, 5.0),
            (4.0, 4.0),
            (2.0, 3.0),
            (3.0, 2.0),
            (1.0, 1.0),
            (5.0, 1.0),
            (7.0, 3.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_random_tour_is_permutation() {
        let cities = get_test_cities();
        let mut rng = StdRng::seed_from_u64(7);
        let identity: Genome = cities.ids().collect();

        for _ in 0..200 {
            let tour = Tour::random(&cities, &mut rng);
            assert_eq!(tour.len(), cities.len());
            assert!(is_permutation_of(&identity, tour.genes()));
        }
    }

    #[test]
    fn test_fitness_is_cached_and_deterministic() {
        let cities = get_test_cities();
        let mut rng = StdRng::seed_from_u64(11);
        let tour = Tour::random(&cities, &mut rng);

        assert_eq!(tour.cached_fitness(), None);
        let first = tour.fitness(&cities);
        assert_eq!(tour.cached_fitness(), Some(first));
        assert_eq!(tour.fitness(&cities), first);

        let twin = Tour::from_genes(tour.genes().to_vec());
        assert_eq!(twin.fitness(&cities), first);
        assert!(first >= 0.0);
    }

    #[test]
    fn test_fitness_of_single_city_is_zero() {
        let cities = get_test_cities();
        let tour = Tour::from_genes(vec![3]);
        assert_eq!(tour.fitness(&cities), 0.0);
    }

    #[test]
    fn test_fitness_sums_consecutive_edges() {
        let cities = CityTable::new(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]).unwrap();
        assert_eq!(Tour::from_genes(vec![1, 2, 3, 4]).fitness(&cities), 3.0);
        let diagonal = Tour::from_genes(vec![1, 3, 2, 4]).fitness(&cities);
        assert!((diagonal - (2.0 * 2f64.sqrt() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_is_permutation_of() {
        assert!(is_permutation_of(&[1, 2, 3, 4], &[4, 3, 2, 1]));
        assert!(!is_permutation_of(&[1, 2, 3, 4], &[1, 1, 3, 4]));
        assert!(!is_permutation_of(&[1, 2, 3, 4], &[1, 2, 3]));
        assert!(!is_permutation_of(&[1, 2, 3, 4], &[1, 2, 3, 5]));
        assert!(!is_permutation_of(&[1, 2, 3, 4], &[0, 2, 3, 4]));
    }

    #[test]
    #[should_panic(expected = "permutation invariant violated")]
    fn test_offspring_panics_on_duplicate_city() {
        let parent = Tour::from_genes(vec![1, 2, 3, 4]);
        let _ = Tour::offspring(&parent, vec![1, 2, 2, 4]);
    }
}
