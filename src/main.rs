use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tsp_evolver::config::Config;
use tsp_evolver::evolution::{EvolutionEngine, GenerationSnapshot};

fn main() {
    env_logger::init();
    log::info!("Booting tsp_evolver...");

    // 1. Load and Validate Configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));
    let config = match Config::load(Path::new(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            log::error!(
                "Failed to load configuration '{}': {}",
                config_path.display(),
                e
            );
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        log::error!("Invalid configuration: {}", e);
        process::exit(1);
    }
    log::info!("Configuration loaded and validated.");

    // 2. Build the City Table
    let cities = match config.cities.build_table() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to build city table: {}", e);
            process::exit(1);
        }
    };

    // 3. Run the Evolution
    log::info!("--- Starting Evolution ---");
    let started = Instant::now();
    let mut engine = match EvolutionEngine::new(&config.ga, &cities) {
        Ok(e) => e,
        Err(e) => {
            log::error!("Failed to seed the evolution: {}", e);
            process::exit(1);
        }
    };

    let mut report_progress = |snapshot: &GenerationSnapshot<'_>| {
        log::debug!(
            "Gen {} best route {:?}",
            snapshot.generation,
            snapshot.generation_best.genes()
        );
    };
    let summary = match engine.evolve_with(&mut report_progress) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Evolution failed: {}", e);
            process::exit(1);
        }
    };
    log::info!(
        "--- Evolution Complete in {:.3}s ---",
        started.elapsed().as_secs_f64()
    );

    // 4. Report
    println!("Best route: {:?}", summary.best_tour.genes());
    println!("Best distance: {:.4}", summary.best_fitness);
    println!("Best distance per generation:");
    for (generation, fitness) in summary.history.iter().enumerate() {
        println!("  [{:>4}] {:.4}", generation + 1, fitness);
    }
}
