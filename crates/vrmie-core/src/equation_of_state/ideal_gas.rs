use super::ParametersAD;
use num_dual::{first_derivative, Dual, DualNum};

/// Ideal gas Helmholtz energy contribution.
pub trait IdealGas: ParametersAD {
    /// The name of the ideal gas model.
    const IDEAL_GAS: &'static str;

    /// The thermal de Broglie wavelength cubed, ln(Λ³/Å³).
    fn ln_lambda3<D: DualNum<f64> + Copy>(parameters: &Self::Parameters<D>, temperature: D) -> D;

    /// The reduced ideal gas Helmholtz energy ln(ρΛ³) - 1.
    fn ideal_gas_helmholtz_energy<D: DualNum<f64> + Copy>(
        parameters: &Self::Parameters<D>,
        temperature: D,
        density: D,
    ) -> D {
        density.ln() + Self::ln_lambda3(parameters, temperature) - 1.0
    }

    /// The reduced ideal gas Helmholtz energy and its first and second
    /// derivatives with respect to density.
    fn ideal_gas_helmholtz_energy_derivatives<D: DualNum<f64> + Copy>(
        parameters: &Self::Parameters<D>,
        temperature: D,
        density: D,
    ) -> [D; 3] {
        let a = Self::ideal_gas_helmholtz_energy(parameters, temperature, density);
        let rho_inv = density.recip();
        [a, rho_inv, -rho_inv * rho_inv]
    }

    /// The ideal gas entropy per molecule in units of k_B.
    fn ideal_gas_entropy<D: DualNum<f64> + Copy>(
        parameters: &Self::Parameters<D>,
        temperature: D,
        density: D,
    ) -> D {
        let params = Self::lift_parameters(parameters, Dual::from_re);
        let rho = Dual::from_re(density);
        let (_, da_dt) = first_derivative(
            |t| Self::ideal_gas_helmholtz_energy(&params, t, rho) * t,
            temperature,
        );
        -da_dt
    }
}
