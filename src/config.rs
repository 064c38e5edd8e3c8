use crate::cities::{CityError, CityTable};
use crate::evolution::EvolutionError;
use crate::evolution::population::DEFAULT_TOURNAMENT_FRACTION;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid [ga] section: {0}")]
    Evolution(#[from] EvolutionError),
    #[error("Invalid [cities] section: {0}")]
    Cities(#[from] CityError),
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub ga: GaConfig,
    pub cities: CityConfig,
}

/// Parameters of a single evolution run.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GaConfig {
    /// Number of tours in every generation
    pub population_size: usize,
    /// Fixed number of generations to run
    pub num_generations: usize,
    /// Share of the population drawn into each tournament, in `(0, 1]`
    #[serde(default = "default_tournament_fraction")]
    pub tournament_fraction: f64,
    /// Probability that a child comes from segment reversal rather than
    /// segment relocation, in `[0, 1]`
    #[serde(default = "default_reversal_probability")]
    pub reversal_probability: f64,
    /// Seed for the run's random source; drawn from the OS when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Breed each generation's children on the rayon thread pool
    #[serde(default)]
    pub parallel: bool,
}

fn default_tournament_fraction() -> f64 {
    DEFAULT_TOURNAMENT_FRACTION
}

fn default_reversal_probability() -> f64 {
    0.5
}

impl GaConfig {
    /// Config with the default operator settings and no fixed seed.
    pub fn new(population_size: usize, num_generations: usize) -> Self {
        Self {
            population_size,
            num_generations,
            tournament_fraction: default_tournament_fraction(),
            reversal_probability: default_reversal_probability(),
            seed: None,
            parallel: false,
        }
    }

    pub fn validate(&self) -> Result<(), EvolutionError> {
        if self.population_size < 1 {
            return Err(EvolutionError::EmptyPopulation);
        }
        if self.num_generations < 1 {
            return Err(EvolutionError::NoGenerations);
        }
        if !(self.tournament_fraction > 0.0 && self.tournament_fraction <= 1.0) {
            return Err(EvolutionError::InvalidTournamentFraction(
                self.tournament_fraction,
            ));
        }
        if !(0.0..=1.0).contains(&self.reversal_probability) {
            return Err(EvolutionError::InvalidReversalProbability(
                self.reversal_probability,
            ));
        }
        Ok(())
    }
}

/// The problem instance: city coordinates in id order.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CityConfig {
    pub coordinates: Vec<(f64, f64)>,
}

impl CityConfig {
    pub fn build_table(&self) -> Result<CityTable, CityError> {
        CityTable::new(&self.coordinates)
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        content.parse()
    }

    /// Checks every section before a run is attempted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ga.validate()?;
        self.cities.build_table()?;
        Ok(())
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(content)?)
    }
}
