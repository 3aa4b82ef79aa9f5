//! Parameter directory loading and validation.

pub mod config;
pub mod csv_loader;

pub use config::{FeeSourceParams, SimulationParameters};
pub use csv_loader::{load_directory, CsvValue, RawParameterSet};
