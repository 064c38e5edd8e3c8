pub mod operators;
pub mod population;
pub mod tour;

use crate::cities::CityTable;
use crate::config::GaConfig;
use crate::evolution::operators::recombine;
use crate::evolution::population::Population;
use crate::evolution::tour::Tour;
use log::{debug, info, warn};
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvolutionError {
    #[error("Population size must be at least 1")]
    EmptyPopulation,
    #[error("Number of generations must be at least 1")]
    NoGenerations,
    #[error("Tournament fraction must lie in (0, 1], got {0}")]
    InvalidTournamentFraction(f64),
    #[error("Reversal probability must lie in [0, 1], got {0}")]
    InvalidReversalProbability(f64),
    #[error("All {0} generations have already run")]
    BudgetExhausted(usize),
}

/// Where an engine is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Initial population built, no generation run yet
    Seeded,
    /// At least one generation run, budget not yet spent
    Evolving,
    /// Every configured generation has run
    Done,
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Best tour seen in any generation
    pub best_tour: Tour,
    /// Fitness of `best_tour`
    pub best_fitness: f64,
    /// Best fitness of each generation, in order. This is the best of that
    /// generation alone, so it can rise between generations.
    pub history: Vec<f64>,
}

/// View of the engine handed to a [`GenerationObserver`] after each generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationSnapshot<'a> {
    /// 1-based number of the generation just completed
    pub generation: usize,
    pub generation_best: &'a Tour,
    pub best_ever: &'a Tour,
    pub history: &'a [f64],
}

/// Sink for per-generation snapshots, e.g. a plotter or progress display.
pub trait GenerationObserver {
    fn on_generation(&mut self, snapshot: &GenerationSnapshot<'_>);
}

impl<F> GenerationObserver for F
where
    F: FnMut(&GenerationSnapshot<'_>),
{
    fn on_generation(&mut self, snapshot: &GenerationSnapshot<'_>) {
        self(snapshot)
    }
}

/// Drives the genetic algorithm: every generation, each slot of the next
/// population is filled by a tournament winner of the current one, passed
/// through a randomly chosen recombination operator. The engine keeps the
/// best tour ever seen and the best fitness of every generation.
pub struct EvolutionEngine<'a> {
    /// User-defined parameters of the run
    config: &'a GaConfig,
    /// The problem instance, shared read-only with every tour
    cities: &'a CityTable,
    /// The single random source of the run
    rng: StdRng,
    /// Current generation, replaced wholesale after every step
    population: Population,
    /// Index into `population` of the current generation's best tour
    generation_best: usize,
    best_ever: Option<Tour>,
    history: Vec<f64>,
    generation: usize,
}

impl<'a> EvolutionEngine<'a> {
    /// Validates the parameters and seeds a random initial population.
    ///
    /// # Arguments
    /// * `config` - Parameters of the run; `seed` fixes the random source.
    /// * `cities` - The problem instance.
    ///
    /// # Returns
    /// * `Result<Self, EvolutionError>` - The engine in the `Seeded` phase, or the
    ///   first invalid parameter found.
    pub fn new(config: &'a GaConfig, cities: &'a CityTable) -> Result<Self, EvolutionError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        info!(
            "Initializing population of size {} over {} cities...",
            config.population_size,
            cities.len()
        );
        let population = Population::random(config.population_size, cities, &mut rng);

        let tournament_size = population.tournament_size(config.tournament_fraction);
        if tournament_size == 1 && config.population_size > 1 {
            warn!(
                "Tournament fraction {} selects a single contender out of {}; selection is uniform",
                config.tournament_fraction, config.population_size
            );
        }

        Ok(Self {
            config,
            cities,
            rng,
            population,
            generation_best: 0,
            best_ever: None,
            history: Vec::new(),
            generation: 0,
        })
    }

    pub fn phase(&self) -> Phase {
        if self.generation == 0 {
            Phase::Seeded
        } else if self.generation < self.config.num_generations {
            Phase::Evolving
        } else {
            Phase::Done
        }
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn best_ever(&self) -> Option<&Tour> {
        self.best_ever.as_ref()
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Number of generations run so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Runs one generation.
    ///
    /// # Returns
    /// * `Result<f64, EvolutionError>` - Best fitness of the new generation, or
    ///   `BudgetExhausted` once every configured generation has run.
    pub fn step(&mut self) -> Result<f64, EvolutionError> {
        if self.phase() == Phase::Done {
            return Err(EvolutionError::BudgetExhausted(self.config.num_generations));
        }

        // One seed per child, so the outcome is the same whether the
        // children are bred in order or on the thread pool.
        let seeds: Vec<u64> = (0..self.config.population_size)
            .map(|_| self.rng.random())
            .collect();

        let parents = &self.population;
        let cities = self.cities;
        let config = self.config;
        let breed = |seed: u64| breed_child(parents, cities, config, seed);

        let children: Vec<Tour> = if config.parallel {
            parents.evaluate(cities);
            seeds.into_par_iter().map(breed).collect()
        } else {
            seeds.into_iter().map(breed).collect()
        };

        let next = Population::from_tours(children);
        if config.parallel {
            next.evaluate(cities);
        }

        let best_index = next
            .best_index(cities)
            .ok_or(EvolutionError::EmptyPopulation)?;
        let best = &next.tours()[best_index];
        let best_fitness = best.fitness(cities);

        self.history.push(best_fitness);
        let improved = match &self.best_ever {
            Some(current) => best_fitness < current.fitness(cities),
            None => true,
        };
        if improved {
            debug!("New best-ever tour: {:?}", best.genes());
            self.best_ever = Some(best.clone());
        }

        self.population = next;
        self.generation_best = best_index;
        self.generation += 1;

        info!(
            "Gen {}/{}: Best Fitness={:.4} | Best Ever={:.4}",
            self.generation,
            self.config.num_generations,
            best_fitness,
            self.best_ever
                .as_ref()
                .map_or(best_fitness, |t| t.fitness(cities))
        );

        Ok(best_fitness)
    }

    /// Runs every remaining generation.
    pub fn evolve(&mut self) -> Result<RunSummary, EvolutionError> {
        self.evolve_with(&mut |_: &GenerationSnapshot<'_>| {})
    }

    /// Runs every remaining generation, reporting to `observer` after each one.
    pub fn evolve_with<O>(&mut self, observer: &mut O) -> Result<RunSummary, EvolutionError>
    where
        O: GenerationObserver + ?Sized,
    {
        while self.phase() != Phase::Done {
            self.step()?;
            if let Some(snapshot) = self.snapshot() {
                observer.on_generation(&snapshot);
            }
        }

        info!("Evolution complete.");
        self.summary().ok_or(EvolutionError::NoGenerations)
    }

    /// Snapshot of the latest generation; `None` before the first step.
    pub fn snapshot(&self) -> Option<GenerationSnapshot<'_>> {
        let best_ever = self.best_ever.as_ref()?;
        Some(GenerationSnapshot {
            generation: self.generation,
            generation_best: &self.population.tours()[self.generation_best],
            best_ever,
            history: &self.history,
        })
    }

    /// Best-ever tour and history so far; `None` before the first step.
    pub fn summary(&self) -> Option<RunSummary> {
        let best_tour = self.best_ever.clone()?;
        Some(RunSummary {
            best_fitness: best_tour.fitness(self.cities),
            best_tour,
            history: self.history.clone(),
        })
    }
}

/// Selects a parent by tournament and recombines it into one child, drawing
/// all randomness from a generator seeded with `seed`.
fn breed_child(parents: &Population, cities: &CityTable, config: &GaConfig, seed: u64) -> Tour {
    let mut rng = StdRng::seed_from_u64(seed);
    let parent = parents.tournament_winner(cities, config.tournament_fraction, &mut rng);
    recombine(parent, config.reversal_probability, &mut rng)
}
