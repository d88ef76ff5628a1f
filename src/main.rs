mod builder;
mod cli;
mod config;
mod controller;
#[cfg(test)]
mod fake;
mod model;
mod permission;
mod provider;
mod storage;

use std::process;

use config::Config;
use storage::Storage;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let root = config.storage_root().unwrap_or_else(|| {
        eprintln!("Could not determine home directory.");
        process::exit(1);
    });

    let storage = match Storage::new(root) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize storage: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(&config, storage) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
