use super::PhaseEquilibrium;
use crate::equation_of_state::{HelmholtzEnergyWrapper, ParametersAD, ResidualHelmholtzEnergy};
use crate::errors::{EosError, EosResult};
use crate::state::{Contributions, State};
use crate::{ReferenceSystem, SolverOptions};
use ndarray::Array1;
use quantity::{Density, Pressure, Temperature};

/// Pure component phase diagram.
pub struct PhaseDiagram<'a, E: ParametersAD> {
    pub states: Vec<PhaseEquilibrium<'a, E>>,
}

impl<E: ParametersAD> Clone for PhaseDiagram<'_, E> {
    fn clone(&self) -> Self {
        Self {
            states: self.states.clone(),
        }
    }
}

impl<'a, E: ParametersAD> PhaseDiagram<'a, E> {
    /// Create a phase diagram from a list of phase equilibria.
    pub fn new(states: Vec<PhaseEquilibrium<'a, E>>) -> Self {
        Self { states }
    }

    /// Return the vapor states of the diagram.
    pub fn vapor(&self) -> Vec<&State<'a, E>> {
        self.states.iter().map(|s| s.vapor()).collect()
    }

    /// Return the liquid states of the diagram.
    pub fn liquid(&self) -> Vec<&State<'a, E>> {
        self.states.iter().map(|s| s.liquid()).collect()
    }

    /// Temperatures of all phase equilibria.
    pub fn temperature(&self) -> Vec<Temperature> {
        self.states.iter().map(|s| s.vapor().temperature).collect()
    }
}

impl<'a, E: ResidualHelmholtzEnergy> PhaseDiagram<'a, E> {
    /// Calculate a phase diagram for a pure component.
    ///
    /// The temperatures are equally spaced between `min_temperature` and the
    /// critical temperature. The last entry is the critical point itself.
    pub fn pure(
        eos: &'a HelmholtzEnergyWrapper<E, f64>,
        min_temperature: Temperature,
        npoints: usize,
        critical_temperature: Option<Temperature>,
        options: SolverOptions,
    ) -> EosResult<Self> {
        if npoints < 2 {
            return Err(EosError::Error(format!(
                "A phase diagram requires at least 2 points, got {npoints}."
            )));
        }
        let mut states = Vec::with_capacity(npoints);

        let sc = State::critical_point(eos, critical_temperature, SolverOptions::default())?;

        let t_min = min_temperature.into_reduced();
        let t_c = sc.reduced_temperature;
        let t_max = t_min + (t_c - t_min) * ((npoints - 2) as f64 / (npoints - 1) as f64);
        let temperatures = Array1::linspace(t_min, t_max, npoints - 1);

        let mut vle = None;
        for &ti in temperatures.iter() {
            vle = PhaseEquilibrium::pure_t(
                eos,
                Temperature::from_reduced(ti),
                vle.as_ref(),
                options,
            )
            .ok();
            if let Some(vle) = vle.as_ref() {
                states.push(vle.clone());
            }
        }
        states.push(PhaseEquilibrium::from_states(sc.clone(), sc));

        Ok(PhaseDiagram::new(states))
    }

    /// Vapor pressures of all phase equilibria.
    pub fn pressure(&self) -> Vec<Pressure> {
        self.states
            .iter()
            .map(|s| s.vapor().pressure(Contributions::Total))
            .collect()
    }

    /// Saturated vapor and liquid densities.
    pub fn densities(&self) -> Vec<[Density; 2]> {
        self.states
            .iter()
            .map(|s| [s.vapor().density, s.liquid().density])
            .collect()
    }
}
