mod error;
mod generator;
mod mt;
mod sweep;

pub use error::ModelError;
pub use generator::{Generator, GeneratorConfig};
pub use mt::Mt19937;
#[cfg(feature = "rayon")]
pub use sweep::sweep_par;
pub use sweep::{Sweep, SweepPoint, SweepValue, sweep};
