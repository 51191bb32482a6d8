use super::{Contributions, State};
use crate::equation_of_state::{IdealGas, ResidualHelmholtzEnergy};
use crate::ReferenceSystem;
use num_dual::{first_derivative, second_derivative, Dual, Dual2, DualNum};
use quantity::{MassDensity, MolarEnergy, MolarEntropy, Pressure};

/// # Residual properties
impl<E: ResidualHelmholtzEnergy, D: DualNum<f64> + Copy> State<'_, E, D> {
    /// Reduced residual Helmholtz energy $A^\mathrm{res}/(NkT)$ of every contribution of the model.
    pub fn residual_helmholtz_energy_contributions(&self) -> Vec<(&'static str, D)> {
        E::residual_helmholtz_energy_contributions(
            &self.eos.parameters,
            self.reduced_temperature,
            self.reduced_density,
        )
    }

    /// Reduced residual Helmholtz energy $A^\mathrm{res}/(NkT)$ and its first
    /// and second derivative with respect to the number density.
    pub fn residual_helmholtz_energy_derivatives(&self) -> [D; 3] {
        E::residual_helmholtz_energy_derivatives(
            &self.eos.parameters,
            self.reduced_temperature,
            self.reduced_density,
        )
    }

    /// Pressure: $p=-\left(\frac{\partial A}{\partial V}\right)_{T,N}$
    pub fn pressure(&self, contributions: Contributions) -> Pressure<D> {
        let t = self.reduced_temperature;
        let rho = self.reduced_density;
        let p_ig = t * rho;
        let p = match contributions {
            Contributions::IdealGas => p_ig,
            Contributions::Residual => E::pressure(&self.eos.parameters, t, rho) - p_ig,
            Contributions::Total => E::pressure(&self.eos.parameters, t, rho),
        };
        Pressure::from_reduced(p)
    }

    /// Compressibility factor: $Z=\frac{pV}{NkT}$
    pub fn compressibility(&self, contributions: Contributions) -> D {
        self.pressure(contributions).into_reduced()
            / (self.reduced_temperature * self.reduced_density)
    }

    /// Partial derivative of pressure w.r.t. density: $\left(\frac{\partial p}{\partial \rho}\right)_{T}$
    pub fn dp_drho(&self) -> MolarEnergy<D> {
        let (_, _, dp_drho) = E::p_dpdrho(
            &self.eos.parameters,
            self.reduced_temperature,
            self.reduced_density,
        );
        MolarEnergy::from_reduced(dp_drho)
    }

    /// Second partial derivative of pressure w.r.t. density in units of K·Å³.
    pub fn d2p_drho2(&self) -> D {
        let (_, _, d2p_drho2) = E::p_dpdrho_d2pdrho2(
            &self.eos.parameters,
            self.reduced_temperature,
            self.reduced_density,
        );
        d2p_drho2
    }

    /// Residual molar Helmholtz energy $a^\mathrm{res}=\frac{A^\mathrm{res}}{N}$
    pub fn residual_molar_helmholtz_energy(&self) -> MolarEnergy<D> {
        let t = self.reduced_temperature;
        let a = E::residual_helmholtz_energy(&self.eos.parameters, t, self.reduced_density);
        MolarEnergy::from_reduced(a * t)
    }

    /// Partial derivative of pressure w.r.t. temperature: $\left(\frac{\partial p}{\partial T}\right)_{\rho}$
    pub fn dp_dt(&self) -> D {
        let params = E::lift_parameters(&self.eos.parameters, Dual::from_re);
        let rho = Dual::from_re(self.reduced_density);
        let (_, dp_dt) = first_derivative(|t| E::pressure(&params, t, rho), self.reduced_temperature);
        dp_dt
    }

    /// Residual chemical potential: $\mu^\mathrm{res}=\left(\frac{\partial A^\mathrm{res}}{\partial N}\right)_{T,V}$
    pub fn residual_chemical_potential(&self) -> MolarEnergy<D> {
        MolarEnergy::from_reduced(E::residual_chemical_potential(
            &self.eos.parameters,
            self.reduced_temperature,
            self.reduced_density,
        ))
    }

    /// Residual molar entropy: $s^\mathrm{res}=-\frac{1}{N}\left(\frac{\partial A^\mathrm{res}}{\partial T}\right)_{V,N}$
    pub fn residual_molar_entropy(&self) -> MolarEntropy<D> {
        MolarEntropy::from_reduced(E::residual_entropy(
            &self.eos.parameters,
            self.reduced_temperature,
            self.reduced_density,
        ))
    }

    /// Mass density $\rho^{(m)}=\rho MW$
    pub fn mass_density(&self) -> MassDensity<D> {
        let molar_weight = self.eos.eos.molar_weight().to_reduced();
        MassDensity::from_reduced(self.reduced_density * molar_weight)
    }
}

/// # Properties including the ideal gas contribution
impl<E: ResidualHelmholtzEnergy + IdealGas, D: DualNum<f64> + Copy> State<'_, E, D> {
    fn helmholtz_energy<D2: DualNum<f64> + Copy>(
        parameters: &E::Parameters<D2>,
        temperature: D2,
        density: D2,
        contributions: Contributions,
    ) -> D2 {
        let ig = || E::ideal_gas_helmholtz_energy(parameters, temperature, density);
        let res = || E::residual_helmholtz_energy(parameters, temperature, density);
        match contributions {
            Contributions::IdealGas => ig(),
            Contributions::Residual => res(),
            Contributions::Total => ig() + res(),
        }
    }

    /// Reduced Helmholtz energy $A/(NkT)$ of every contribution, starting with the ideal gas.
    pub fn helmholtz_energy_contributions(&self) -> Vec<(&'static str, D)> {
        let mut res = vec![(
            E::IDEAL_GAS,
            E::ideal_gas_helmholtz_energy(
                &self.eos.parameters,
                self.reduced_temperature,
                self.reduced_density,
            ),
        )];
        res.append(&mut self.residual_helmholtz_energy_contributions());
        res
    }

    /// Reduced Helmholtz energy $A/(NkT)$ and its first and second derivative
    /// with respect to the number density.
    pub fn helmholtz_energy_derivatives(&self, contributions: Contributions) -> [D; 3] {
        let (t, rho) = (self.reduced_temperature, self.reduced_density);
        let ig = || E::ideal_gas_helmholtz_energy_derivatives(&self.eos.parameters, t, rho);
        let res = || E::residual_helmholtz_energy_derivatives(&self.eos.parameters, t, rho);
        match contributions {
            Contributions::IdealGas => ig(),
            Contributions::Residual => res(),
            Contributions::Total => {
                let [a_ig, da_ig, d2a_ig] = ig();
                let [a_res, da_res, d2a_res] = res();
                [a_ig + a_res, da_ig + da_res, d2a_ig + d2a_res]
            }
        }
    }

    /// Molar Helmholtz energy $a=\frac{A}{N}$
    pub fn molar_helmholtz_energy(&self, contributions: Contributions) -> MolarEnergy<D> {
        let t = self.reduced_temperature;
        let a = Self::helmholtz_energy(&self.eos.parameters, t, self.reduced_density, contributions);
        MolarEnergy::from_reduced(a * t)
    }

    /// Chemical potential: $\mu=\left(\frac{\partial A}{\partial N}\right)_{T,V}$
    pub fn chemical_potential(&self, contributions: Contributions) -> MolarEnergy<D> {
        let t = self.reduced_temperature;
        let rho = self.reduced_density;
        let mu_ig = (rho.ln() + E::ln_lambda3(&self.eos.parameters, t)) * t;
        let mu_res = || E::residual_chemical_potential(&self.eos.parameters, t, rho);
        let mu = match contributions {
            Contributions::IdealGas => mu_ig,
            Contributions::Residual => mu_res(),
            Contributions::Total => mu_ig + mu_res(),
        };
        MolarEnergy::from_reduced(mu)
    }

    /// Molar entropy: $s=-\frac{1}{N}\left(\frac{\partial A}{\partial T}\right)_{V,N}$
    pub fn molar_entropy(&self, contributions: Contributions) -> MolarEntropy<D> {
        let params = E::lift_parameters(&self.eos.parameters, Dual::from_re);
        let rho = Dual::from_re(self.reduced_density);
        let (_, da_dt) = first_derivative(
            |t| Self::helmholtz_energy(&params, t, rho, contributions) * t,
            self.reduced_temperature,
        );
        MolarEntropy::from_reduced(-da_dt)
    }

    /// Molar enthalpy: $h=a+Ts+\frac{p}{\rho}$
    pub fn molar_enthalpy(&self, contributions: Contributions) -> MolarEnergy<D> {
        let t = self.reduced_temperature;
        let a = self.molar_helmholtz_energy(contributions).into_reduced();
        let s = self.molar_entropy(contributions).into_reduced();
        let p = self.pressure(contributions).into_reduced();
        MolarEnergy::from_reduced(a + t * s + p / self.reduced_density)
    }

    /// Isochoric heat capacity: $c_v=-\frac{T}{N}\left(\frac{\partial^2 A}{\partial T^2}\right)_{V,N}$
    pub fn molar_isochoric_heat_capacity(&self, contributions: Contributions) -> MolarEntropy<D> {
        let params = E::lift_parameters(&self.eos.parameters, Dual2::from_re);
        let rho = Dual2::from_re(self.reduced_density);
        let t = self.reduced_temperature;
        let (_, _, d2a_dt2) = second_derivative(
            |t| Self::helmholtz_energy(&params, t, rho, contributions) * t,
            t,
        );
        MolarEntropy::from_reduced(-t * d2a_dt2)
    }

    /// Isobaric heat capacity: $c_p=c_v+\frac{T}{\rho^2}\frac{\left(\frac{\partial p}{\partial T}\right)_{\rho}^2}{\left(\frac{\partial p}{\partial \rho}\right)_{T}}$
    pub fn molar_isobaric_heat_capacity(&self, contributions: Contributions) -> MolarEntropy<D> {
        let t = self.reduced_temperature;
        let rho = self.reduced_density;
        match contributions {
            Contributions::Residual => {
                self.molar_isobaric_heat_capacity(Contributions::Total)
                    - self.molar_isobaric_heat_capacity(Contributions::IdealGas)
            }
            Contributions::IdealGas => {
                let c_v = self.molar_isochoric_heat_capacity(contributions).into_reduced();
                MolarEntropy::from_reduced(c_v + 1.0)
            }
            Contributions::Total => {
                let c_v = self.molar_isochoric_heat_capacity(contributions).into_reduced();
                let dp_dt = self.dp_dt();
                let dp_drho = self.dp_drho().into_reduced();
                MolarEntropy::from_reduced(c_v + t * dp_dt * dp_dt / (dp_drho * rho * rho))
            }
        }
    }
}
