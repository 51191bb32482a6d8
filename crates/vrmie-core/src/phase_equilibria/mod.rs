use crate::equation_of_state::ParametersAD;
use crate::state::State;
use num_dual::DualNum;
use std::fmt;

mod phase_diagram;
mod vle_pure;
pub use phase_diagram::PhaseDiagram;

const TRIVIAL_REL_DEVIATION: f64 = 1e-5;

/// A vapor-liquid equilibrium of a pure substance.
///
/// The first state is the vapor, the second state is the liquid phase.
pub struct PhaseEquilibrium<'a, E: ParametersAD, D: DualNum<f64> + Copy = f64>(
    pub [State<'a, E, D>; 2],
);

impl<E: ParametersAD, D: DualNum<f64> + Copy> Clone for PhaseEquilibrium<'_, E, D> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<E: ParametersAD> fmt::Display for PhaseEquilibrium<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "vapor:  {}", self.vapor())?;
        write!(f, "liquid: {}", self.liquid())
    }
}

impl<'a, E: ParametersAD, D: DualNum<f64> + Copy> PhaseEquilibrium<'a, E, D> {
    pub fn vapor(&self) -> &State<'a, E, D> {
        &self.0[0]
    }

    pub fn liquid(&self) -> &State<'a, E, D> {
        &self.0[1]
    }

    pub(super) fn from_states(state1: State<'a, E, D>, state2: State<'a, E, D>) -> Self {
        let (vapor, liquid) = if state1.reduced_density.re() < state2.reduced_density.re() {
            (state1, state2)
        } else {
            (state2, state1)
        };
        Self([vapor, liquid])
    }

    /// Whether the densities of both phases are (almost) identical.
    pub fn is_trivial_solution(&self) -> bool {
        let rho_v = self.vapor().reduced_density.re();
        let rho_l = self.liquid().reduced_density.re();
        (rho_v / rho_l - 1.0).abs() < TRIVIAL_REL_DEVIATION
    }
}
