use crate::errors::EosResult;
use num_dual::{Dual64, DualNum};
use quantity::MolarWeight;
use std::sync::Arc;

mod ideal_gas;
mod residual;
pub use ideal_gas::IdealGas;
pub use residual::ResidualHelmholtzEnergy;

/// A model that can be evaluated with derivatives of its parameters.
pub trait ParametersAD: Send + Sync + Sized {
    /// The type of the structure that stores the parameters internally.
    type Parameters<D: DualNum<f64> + Copy>: Clone;

    /// Return the parameters in the given data type.
    fn params<D: DualNum<f64> + Copy>(&self) -> Self::Parameters<D>;

    /// Map every parameter into another (dual) number type.
    fn lift_parameters<D: DualNum<f64> + Copy, D2: DualNum<f64> + Copy, F: Fn(D) -> D2>(
        parameters: &Self::Parameters<D>,
        f: F,
    ) -> Self::Parameters<D2>;

    /// The molar weight of the substance.
    fn molar_weight(&self) -> MolarWeight;

    /// Wrap the model so that it can be used to construct states and
    /// phase equilibria.
    fn wrap(self) -> HelmholtzEnergyWrapper<Self, f64> {
        let parameters = self.params();
        HelmholtzEnergyWrapper {
            eos: Arc::new(self),
            parameters,
        }
    }
}

/// Models for which derivatives with respect to individual parameters can be calculated.
pub trait NamedParameters: ParametersAD {
    /// Return a mutable reference to the parameter named by `index` from the parameter set.
    fn index_parameters_mut<'a, D: DualNum<f64> + Copy>(
        parameters: &'a mut Self::Parameters<D>,
        index: &str,
    ) -> EosResult<&'a mut D>;
}

/// Struct that stores the reference to the model together with the (possibly) dual parameters.
pub struct HelmholtzEnergyWrapper<E: ParametersAD, D: DualNum<f64> + Copy> {
    pub eos: Arc<E>,
    pub parameters: E::Parameters<D>,
}

impl<E: ParametersAD, D: DualNum<f64> + Copy> Clone for HelmholtzEnergyWrapper<E, D> {
    fn clone(&self) -> Self {
        Self {
            eos: self.eos.clone(),
            parameters: self.parameters.clone(),
        }
    }
}

impl<E: ParametersAD, D: DualNum<f64> + Copy> HelmholtzEnergyWrapper<E, D> {
    /// The real part of the parameters.
    pub fn re(&self) -> E::Parameters<f64> {
        E::lift_parameters(&self.parameters, |p| p.re())
    }
}

impl<E: ParametersAD> HelmholtzEnergyWrapper<E, f64> {
    /// Manually set the parameters and their derivatives.
    pub fn derivatives<D: DualNum<f64> + Copy>(
        &self,
        parameters: E::Parameters<D>,
    ) -> HelmholtzEnergyWrapper<E, D> {
        HelmholtzEnergyWrapper {
            eos: self.eos.clone(),
            parameters,
        }
    }
}

impl<E: NamedParameters> HelmholtzEnergyWrapper<E, f64> {
    /// Initialize the parameters to calculate the derivative with respect to
    /// the parameter named `parameter`.
    pub fn named_derivative(&self, parameter: &str) -> EosResult<HelmholtzEnergyWrapper<E, Dual64>> {
        let mut params: E::Parameters<Dual64> = self.eos.params();
        E::index_parameters_mut(&mut params, parameter)?.eps = 1.0;
        Ok(self.derivatives(params))
    }
}
