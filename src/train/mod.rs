pub mod epoch_stats;
pub mod loop_fn;
pub mod train_config;

pub use epoch_stats::{EpochStats, History};
pub use train_config::FitConfig;
