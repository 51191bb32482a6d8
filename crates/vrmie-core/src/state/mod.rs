//! Description of a thermodynamic state of a pure substance.
use crate::density_iteration::density_iteration;
use crate::equation_of_state::{HelmholtzEnergyWrapper, ParametersAD, ResidualHelmholtzEnergy};
use crate::errors::{EosError, EosResult};
use crate::ReferenceSystem;
use num_dual::DualNum;
use quantity::{Density, Pressure, Temperature};
use std::fmt;

mod critical_point;
mod properties;

/// Part of the Helmholtz energy that a property is evaluated for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contributions {
    /// de Broglie ideal gas
    IdealGas,
    /// Everything but the ideal gas
    Residual,
    /// Ideal gas plus residual
    Total,
}

/// Starting point of a density iteration at given temperature and pressure.
#[derive(Clone, Copy, Debug)]
pub enum DensityInitialization<D = Density> {
    /// Start from the ideal gas density.
    Vapor,
    /// Start close to the maximum packing density of the model.
    Liquid,
    /// Start from a known density.
    InitialDensity(D),
}

impl DensityInitialization {
    pub fn into_reduced(self) -> DensityInitialization<f64> {
        match self {
            Self::Vapor => DensityInitialization::Vapor,
            Self::Liquid => DensityInitialization::Liquid,
            Self::InitialDensity(d) => DensityInitialization::InitialDensity(d.into_reduced()),
        }
    }
}

/// Thermodynamic state of a pure substance, defined by its temperature and
/// density.
///
/// With dual parameters (or a dual temperature/density) all properties carry
/// the corresponding derivatives.
pub struct State<'a, E: ParametersAD, D: DualNum<f64> + Copy = f64> {
    /// Model and (possibly dual) parameters
    pub eos: &'a HelmholtzEnergyWrapper<E, D>,
    /// Temperature $T$
    pub temperature: Temperature<D>,
    /// Number density $\rho$
    pub density: Density<D>,
    /// Reduced temperature
    pub(crate) reduced_temperature: D,
    /// Reduced density
    pub(crate) reduced_density: D,
}

impl<E: ParametersAD, D: DualNum<f64> + Copy> Clone for State<'_, E, D> {
    fn clone(&self) -> Self {
        Self::from_reduced(self.eos, self.reduced_temperature, self.reduced_density)
    }
}

impl<E: ParametersAD> fmt::Display for State<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T = {:.5}, ρ = {:.5}", self.temperature, self.density)
    }
}

impl<'a, E: ParametersAD, D: DualNum<f64> + Copy> State<'a, E, D> {
    pub(crate) fn from_reduced(
        eos: &'a HelmholtzEnergyWrapper<E, D>,
        temperature: D,
        density: D,
    ) -> Self {
        Self {
            eos,
            temperature: Temperature::from_reduced(temperature),
            density: Density::from_reduced(density),
            reduced_temperature: temperature,
            reduced_density: density,
        }
    }

    /// Create a state from temperature and density.
    pub fn new(
        eos: &'a HelmholtzEnergyWrapper<E, D>,
        temperature: Temperature<D>,
        density: Density<D>,
    ) -> EosResult<Self> {
        let t = temperature.into_reduced();
        let rho = density.into_reduced();
        validate(t.re(), rho.re())?;
        Ok(Self::from_reduced(eos, t, rho))
    }
}

impl<'a, E: ResidualHelmholtzEnergy, D: DualNum<f64> + Copy> State<'a, E, D> {
    /// Create a state from temperature and pressure.
    ///
    /// If no initialization is given, the stable phase is determined.
    pub fn new_tp(
        eos: &'a HelmholtzEnergyWrapper<E, D>,
        temperature: Temperature<D>,
        pressure: Pressure<D>,
        density_initialization: Option<DensityInitialization>,
    ) -> EosResult<Self> {
        let density = density_iteration(eos, temperature, pressure, density_initialization)?;
        Self::new(eos, temperature, density)
    }
}

fn validate(temperature: f64, density: f64) -> EosResult<()> {
    let invalid = |x: f64| !x.is_finite() || x < 0.0;
    let check = |name: &str, value: f64| {
        if invalid(value) {
            Err(EosError::InvalidState(
                String::from("State::new"),
                String::from(name),
                value,
            ))
        } else {
            Ok(())
        }
    };
    check("temperature", temperature)?;
    check("density", density)
}
