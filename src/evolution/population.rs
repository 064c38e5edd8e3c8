use super::tour::Tour;
use crate::cities::CityTable;
use rand::Rng;
use rayon::prelude::*;

/// Default share of the population drawn into each tournament.
pub const DEFAULT_TOURNAMENT_FRACTION: f64 = 0.05;

/// A fixed-size generation of tours over the same `CityTable`.
#[derive(Debug, Clone)]
pub struct Population {
    tours: Vec<Tour>,
}

impl Population {
    /// Creates `size` independent random tours.
    pub fn random<R: Rng + ?Sized>(size: usize, cities: &CityTable, rng: &mut R) -> Self {
        Self {
            tours: (0..size).map(|_| Tour::random(cities, rng)).collect(),
        }
    }

    pub fn from_tours(tours: Vec<Tour>) -> Self {
        Self { tours }
    }

    pub fn len(&self) -> usize {
        self.tours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }

    pub fn tours(&self) -> &[Tour] {
        &self.tours
    }

    /// Forces every tour's fitness into its cache, in parallel.
    pub fn evaluate(&self, cities: &CityTable) {
        self.tours.par_iter().for_each(|tour| {
            tour.fitness(cities);
        });
    }

    /// Number of contenders drawn by [`Population::tournament_winner`]:
    /// `floor(len * fraction)`, never below one.
    pub fn tournament_size(&self, fraction: f64) -> usize {
        ((self.tours.len() as f64 * fraction).floor() as usize).max(1)
    }

    /// Runs one tournament and returns its winner.
    ///
    /// Contenders are drawn uniformly with replacement. The lowest fitness
    /// wins; on a tie the contender drawn first is kept.
    ///
    /// # Panics
    /// Panics on an empty population.
    pub fn tournament_winner<R: Rng + ?Sized>(
        &self,
        cities: &CityTable,
        fraction: f64,
        rng: &mut R,
    ) -> &Tour {
        let contenders = self.tournament_size(fraction);
        let mut winner = &self.tours[rng.random_range(0..self.tours.len())];
        for _ in 1..contenders {
            let contender = &self.tours[rng.random_range(0..self.tours.len())];
            if contender.fitness(cities) < winner.fitness(cities) {
                winner = contender;
            }
        }
        winner
    }

    /// Tour with the lowest fitness; the earliest one wins ties.
    pub fn best(&self, cities: &CityTable) -> Option<&Tour> {
        self.best_index(cities).map(|i| &self.tours[i])
    }

    /// Position of [`Population::best`] within the population.
    pub fn best_index(&self, cities: &CityTable) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, tour) in self.tours.iter().enumerate() {
            match best {
                Some(b) if tour.fitness(cities) >= self.tours[b].fitness(cities) => {}
                _ => best = Some(i),
            }
        }
        best
    }
}
