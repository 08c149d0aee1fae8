//! Parallel single-spin-flip Metropolis engines for the 2D Ising model.
//!
//! Three interchangeable update strategies drive a shared temperature sweep:
//! a serial baseline, domain decomposition with locked block seams, and a
//! sliding window that avoids block edges and periodically translates the
//! lattice.

pub mod config;
pub mod error;
pub mod geometry;
pub mod mcmc;
pub mod parallel;
pub mod simulation;
pub mod spins;
pub mod statistics;

pub use config::{InitialSpins, SimConfig};
pub use error::IsingError;
pub use geometry::Lattice;
pub use mcmc::{DomainDecomposition, ProbabilityTable, Serial, SlidingWindow, UpdateStrategy};
pub use simulation::{Phase, Simulation};
pub use spins::{Observables, SpinLattice};
pub use statistics::{SweepRecord, SweepResult};
