//! Trains a one-hidden-layer network on a whitespace-delimited regression
//! table (the Boston housing layout: 13 feature columns, then the target).
//!
//! Usage: `cargo run --example housing_regression -- path/to/housing.data [epochs]`

use miniflow_data::{load_table, train, TrainingConfig};
use std::env;
use std::error::Error;
use std::process;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("usage: housing_regression <data file> [epochs]");
            process::exit(2);
        }
    };
    let mut config = TrainingConfig::default();
    if let Some(epochs) = args.next() {
        config = config.with_epochs(epochs.parse()?);
    }

    let dataset = load_table(&path, 1)?;
    let report = train(&config, &dataset)?;

    for (epoch, loss) in report.epoch_losses.iter().enumerate() {
        println!("Epoch: {}, Loss: {:.3}", epoch + 1, loss);
    }
    Ok(())
}
