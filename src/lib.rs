//! Genetic-algorithm search for short open paths through a set of cities.
//!
//! A [`cities::CityTable`] fixes the problem instance, and an
//! [`evolution::EvolutionEngine`] evolves a population of
//! [`evolution::tour::Tour`]s over a fixed number of generations.

pub mod cities;
pub mod config;
pub mod evolution;
