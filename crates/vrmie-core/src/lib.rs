//! Core traits and solvers for pure-component equations of state that
//! are evaluated with (generalized) dual numbers.
//!
//! Models implement [ResidualHelmholtzEnergy] (and optionally [IdealGas])
//! for a parameter type that can be held in any dual number type.
//! Properties, densities, critical points and phase equilibria are then
//! available for plain `f64` parameters and, through implicit
//! differentiation, for parameters with derivatives.
#![warn(clippy::all)]
use quantity::{Quantity, SIUnit};
use std::ops::{Div, Mul};
use typenum::Integer;

/// Print iteration details if the verbosity is at least [Verbosity::Iter].
#[macro_export]
macro_rules! log_iter {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::Verbosity::Iter {
            println!($($arg)*);
        }
    }
}

/// Print a convergence summary if the verbosity is at least [Verbosity::Result].
#[macro_export]
macro_rules! log_result {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::Verbosity::Result {
            println!($($arg)*);
        }
    }
}

mod density_iteration;
mod equation_of_state;
mod errors;
pub mod parameter;
mod phase_equilibria;
mod state;
pub use density_iteration::density_iteration;
pub use equation_of_state::{
    HelmholtzEnergyWrapper, IdealGas, NamedParameters, ParametersAD, ResidualHelmholtzEnergy,
};
pub use errors::{EosError, EosResult};
pub use phase_equilibria::{PhaseDiagram, PhaseEquilibrium};
pub use state::{Contributions, DensityInitialization, State};

/// Amount of output printed by the solvers.
#[derive(Copy, Clone, PartialOrd, PartialEq, Eq, Debug, Default)]
pub enum Verbosity {
    /// Silent.
    #[default]
    None,
    /// One line when the solver finishes.
    Result,
    /// A table row for every iteration.
    Iter,
}

/// Maximum number of iterations, tolerance and verbosity of a solver.
///
/// Unset values fall back to the defaults of the individual solver.
#[derive(Copy, Clone, Default, Debug)]
pub struct SolverOptions {
    pub max_iter: Option<usize>,
    pub tol: Option<f64>,
    pub verbosity: Verbosity,
}

impl SolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_iter(self, max_iter: usize) -> Self {
        Self {
            max_iter: Some(max_iter),
            ..self
        }
    }

    pub fn tol(self, tol: f64) -> Self {
        Self {
            tol: Some(tol),
            ..self
        }
    }

    pub fn verbosity(self, verbosity: Verbosity) -> Self {
        Self { verbosity, ..self }
    }

    /// Maximum number of iterations, tolerance and verbosity with the
    /// given solver defaults.
    pub fn unwrap_or(self, max_iter: usize, tol: f64) -> (usize, f64, Verbosity) {
        let Self {
            max_iter: n,
            tol: t,
            verbosity,
        } = self;
        (n.unwrap_or(max_iter), t.unwrap_or(tol), verbosity)
    }
}

/// SI values of the units in which all calculations are performed, in the
/// order of the base units of [SIUnit] (s, m, kg, A, K, mol, cd).
///
/// Lengths are measured in Å and energies in units of k_B·K. Amounts are
/// counted in molecules, so that densities are number densities in Å⁻³.
const REDUCED_UNITS: [f64; 7] = [
    1e-12,
    1e-10,
    1.380649e-27,
    1.0,
    1.0,
    1.0 / 6.02214076e23,
    1.0,
];

/// Conversion of quantities from and to reduced units.
pub trait ReferenceSystem {
    type Inner;

    /// SI value of the reduced unit of the quantity.
    fn reference() -> f64;

    fn from_reduced(value: Self::Inner) -> Self
    where
        Self::Inner: Mul<f64, Output = Self::Inner>;

    fn to_reduced(&self) -> Self::Inner
    where
        for<'a> &'a Self::Inner: Div<f64, Output = Self::Inner>;

    fn into_reduced(self) -> Self::Inner
    where
        Self::Inner: Div<f64, Output = Self::Inner>;
}

impl<Inner, T: Integer, L: Integer, M: Integer, I: Integer, THETA: Integer, N: Integer, J: Integer>
    ReferenceSystem for Quantity<Inner, SIUnit<T, L, M, I, THETA, N, J>>
{
    type Inner = Inner;

    fn reference() -> f64 {
        let exponents = [T::I32, L::I32, M::I32, I::I32, THETA::I32, N::I32, J::I32];
        REDUCED_UNITS
            .iter()
            .zip(exponents)
            .map(|(u, e)| u.powi(e))
            .product()
    }

    fn from_reduced(value: Inner) -> Self
    where
        Inner: Mul<f64, Output = Inner>,
    {
        Self::new(value * Self::reference())
    }

    fn to_reduced(&self) -> Inner
    where
        for<'a> &'a Inner: Div<f64, Output = Inner>,
    {
        self.convert_to(Quantity::new(Self::reference()))
    }

    fn into_reduced(self) -> Inner
    where
        Inner: Div<f64, Output = Inner>,
    {
        self.convert_into(Quantity::new(Self::reference()))
    }
}
