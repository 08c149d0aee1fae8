pub mod energy;
pub mod lattice;

pub use energy::{measure, Observables};
pub use lattice::SpinLattice;
