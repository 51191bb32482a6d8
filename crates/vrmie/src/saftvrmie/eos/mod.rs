use super::parameters::{SaftVRMiePars, SaftVRMieRecord};
use crate::association::Association;
use crate::{hard_sphere, ideal_gas};
use num_dual::{second_derivative, Dual2, DualNum};
use quantity::{MolarWeight, GRAM, MOL};
use std::f64::consts::FRAC_PI_6;
use vrmie_core::parameter::PureRecord;
use vrmie_core::{
    EosError, EosResult, IdealGas, NamedParameters, ParametersAD, ResidualHelmholtzEnergy,
};

pub(super) mod association;
pub(crate) mod dispersion;
use association::association_strength;
use dispersion::{a_disp_chain, Properties};

/// Customization options for the SAFT-VR Mie equation of state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SaftVRMieOptions {
    pub max_eta: f64,
    pub max_iter_assoc: usize,
    pub tol_assoc: f64,
}

impl Default for SaftVRMieOptions {
    fn default() -> Self {
        Self {
            max_eta: 0.5,
            max_iter_assoc: 15,
            tol_assoc: 1e-9,
        }
    }
}

/// SAFT-VR Mie equation of state for a pure substance.
pub struct SaftVRMie {
    pub record: PureRecord<SaftVRMieRecord>,
    options: SaftVRMieOptions,
}

impl SaftVRMie {
    pub fn new(record: PureRecord<SaftVRMieRecord>) -> Self {
        Self::with_options(record, SaftVRMieOptions::default())
    }

    pub fn with_options(record: PureRecord<SaftVRMieRecord>, options: SaftVRMieOptions) -> Self {
        Self { record, options }
    }

    /// Hard-sphere, dispersion and chain contributions.
    fn monomer_chain<D: DualNum<f64> + Copy>(
        parameters: &SaftVRMiePars<D>,
        temperature: D,
        density: D,
        diameter: D,
    ) -> [D; 3] {
        let a_hs = hard_sphere::helmholtz_energy(parameters.m, diameter, density);
        let properties = Properties::new(parameters, density, diameter);
        let [a_disp, a_chain] = a_disp_chain(parameters, &properties, temperature);
        [a_hs, a_disp, a_chain]
    }

    fn association(parameters: &SaftVRMiePars<impl DualNum<f64> + Copy>) -> Association {
        let options = parameters.options;
        Association::new(parameters.sites, options.max_iter_assoc, options.tol_assoc)
    }
}

impl ParametersAD for SaftVRMie {
    type Parameters<D: DualNum<f64> + Copy> = SaftVRMiePars<D>;

    fn params<D: DualNum<f64> + Copy>(&self) -> SaftVRMiePars<D> {
        SaftVRMiePars::new(&self.record, self.options)
    }

    fn lift_parameters<D: DualNum<f64> + Copy, D2: DualNum<f64> + Copy, F: Fn(D) -> D2>(
        parameters: &SaftVRMiePars<D>,
        f: F,
    ) -> SaftVRMiePars<D2> {
        parameters.lift(f)
    }

    fn molar_weight(&self) -> MolarWeight {
        self.record.molarweight * GRAM / MOL
    }
}

impl ResidualHelmholtzEnergy for SaftVRMie {
    const RESIDUAL: &'static str = "SAFT-VR Mie";

    fn compute_max_density(&self) -> f64 {
        let r = &self.record.model_record;
        self.options.max_eta / (FRAC_PI_6 * r.m * r.sigma.powi(3))
    }

    fn critical_point_scale(&self) -> Option<[f64; 2]> {
        // temperature m epsilon/k and a fifth of the close packed density
        let r = &self.record.model_record;
        let rho_cp = 0.7405 / (FRAC_PI_6 * r.m * r.sigma.powi(3));
        Some([r.m * r.epsilon_k, 0.2 * rho_cp])
    }

    fn residual_helmholtz_energy_contributions<D: DualNum<f64> + Copy>(
        parameters: &SaftVRMiePars<D>,
        temperature: D,
        density: D,
    ) -> Vec<(&'static str, D)> {
        let mut a = Vec::with_capacity(4);
        let diameter = parameters.hs_diameter(temperature);
        let [a_hs, a_disp, a_chain] =
            Self::monomer_chain(parameters, temperature, density, diameter);
        a.push(("Hard Sphere", a_hs));
        a.push(("Dispersion", a_disp));
        a.push(("Chain", a_chain));

        if parameters.is_associating() {
            let [delta, ..] = association_strength(parameters, temperature, density, diameter);
            let a_assoc = Self::association(parameters)
                .helmholtz_energy(density, delta)
                .unwrap_or_else(|_| D::from(f64::NAN));
            a.push(("Association", a_assoc));
        }
        a
    }

    fn residual_helmholtz_energy_derivatives<D: DualNum<f64> + Copy>(
        parameters: &SaftVRMiePars<D>,
        temperature: D,
        density: D,
    ) -> [D; 3] {
        let params = parameters.lift(Dual2::from_re);
        let t = Dual2::from_re(temperature);
        let diameter = params.hs_diameter(t);
        let (a, da, d2a) = second_derivative(
            |rho| {
                let [a_hs, a_disp, a_chain] = Self::monomer_chain(&params, t, rho, diameter);
                a_hs + a_disp + a_chain
            },
            density,
        );
        if !parameters.is_associating() {
            return [a, da, d2a];
        }

        // the association contribution is differentiated analytically
        let diameter = diameter.re;
        let delta = association_strength(parameters, temperature, density, diameter);
        match Self::association(parameters).helmholtz_energy_derivatives(density, delta) {
            Ok([a_assoc, da_assoc, d2a_assoc]) => [a + a_assoc, da + da_assoc, d2a + d2a_assoc],
            Err(_) => [D::from(f64::NAN); 3],
        }
    }
}

impl IdealGas for SaftVRMie {
    const IDEAL_GAS: &'static str = "Ideal gas (de Broglie)";

    fn ln_lambda3<D: DualNum<f64> + Copy>(parameters: &SaftVRMiePars<D>, temperature: D) -> D {
        ideal_gas::ln_lambda3(parameters.molarweight, temperature)
    }
}

impl NamedParameters for SaftVRMie {
    fn index_parameters_mut<'a, D: DualNum<f64> + Copy>(
        parameters: &'a mut SaftVRMiePars<D>,
        index: &str,
    ) -> EosResult<&'a mut D> {
        match index {
            "m" => Ok(&mut parameters.m),
            "sigma" => Ok(&mut parameters.sigma),
            "epsilon_k" => Ok(&mut parameters.epsilon_k),
            "lr" => Ok(&mut parameters.lr),
            "la" => Ok(&mut parameters.la),
            "epsilon_k_ab" => Ok(&mut parameters.epsilon_k_ab),
            "rc_ab" => Ok(&mut parameters.rc_ab),
            "rd_ab" => Ok(&mut parameters.rd_ab),
            _ => Err(EosError::UnknownParameter(index.to_string())),
        }
    }
}
