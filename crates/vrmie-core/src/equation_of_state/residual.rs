use super::ParametersAD;
use num_dual::{first_derivative, second_derivative, third_derivative, Dual, Dual2, Dual3, DualNum};

/// Implementation of a residual Helmholtz energy model for a pure substance.
///
/// All quantities are in reduced units: temperature in K, number densities in
/// Å⁻³ and energies in units of k_B K. Helmholtz energies without further
/// qualification are per molecule and divided by kT.
pub trait ResidualHelmholtzEnergy: ParametersAD {
    /// The name of the model.
    const RESIDUAL: &'static str;

    /// Return a density (in reduced units) that corresponds to a dense liquid phase.
    fn compute_max_density(&self) -> f64;

    /// Characteristic temperature and density (in reduced units) from which
    /// the critical point is bracketed. Models that return `None` rely on
    /// trial temperatures instead.
    fn critical_point_scale(&self) -> Option<[f64; 2]> {
        None
    }

    /// The individual contributions to the reduced residual Helmholtz energy.
    fn residual_helmholtz_energy_contributions<D: DualNum<f64> + Copy>(
        parameters: &Self::Parameters<D>,
        temperature: D,
        density: D,
    ) -> Vec<(&'static str, D)>;

    /// The reduced residual Helmholtz energy.
    fn residual_helmholtz_energy<D: DualNum<f64> + Copy>(
        parameters: &Self::Parameters<D>,
        temperature: D,
        density: D,
    ) -> D {
        Self::residual_helmholtz_energy_contributions(parameters, temperature, density)
            .into_iter()
            .fold(D::zero(), |acc, (_, a)| acc + a)
    }

    /// The residual Helmholtz energy density A/V in units of K/Å³.
    fn residual_helmholtz_energy_density<D: DualNum<f64> + Copy>(
        parameters: &Self::Parameters<D>,
        temperature: D,
        density: D,
    ) -> D {
        Self::residual_helmholtz_energy(parameters, temperature, density) * temperature * density
    }

    /// The reduced residual Helmholtz energy and its first and second
    /// derivatives with respect to density.
    fn residual_helmholtz_energy_derivatives<D: DualNum<f64> + Copy>(
        parameters: &Self::Parameters<D>,
        temperature: D,
        density: D,
    ) -> [D; 3] {
        let params = Self::lift_parameters(parameters, Dual2::from_re);
        let t = Dual2::from_re(temperature);
        let (a, da, d2a) = second_derivative(
            |rho| Self::residual_helmholtz_energy(&params, t, rho),
            density,
        );
        [a, da, d2a]
    }

    /// The pressure (including the ideal gas contribution).
    fn pressure<D: DualNum<f64> + Copy>(
        parameters: &Self::Parameters<D>,
        temperature: D,
        density: D,
    ) -> D {
        let params = Self::lift_parameters(parameters, Dual::from_re);
        let t = Dual::from_re(temperature);
        let (a, da) = first_derivative(
            |rho| Self::residual_helmholtz_energy_density(&params, t, rho),
            density,
        );
        density * da - a + temperature * density
    }

    /// Residual Helmholtz energy density, pressure and the derivative of the
    /// pressure with respect to density.
    fn p_dpdrho<D: DualNum<f64> + Copy>(
        parameters: &Self::Parameters<D>,
        temperature: D,
        density: D,
    ) -> (D, D, D) {
        let params = Self::lift_parameters(parameters, Dual2::from_re);
        let t = Dual2::from_re(temperature);
        let (f, df, d2f) = second_derivative(
            |rho| Self::residual_helmholtz_energy_density(&params, t, rho),
            density,
        );
        (
            f,
            density * df - f + temperature * density,
            density * d2f + temperature,
        )
    }

    /// Pressure and its first and second derivative with respect to density.
    fn p_dpdrho_d2pdrho2<D: DualNum<f64> + Copy>(
        parameters: &Self::Parameters<D>,
        temperature: D,
        density: D,
    ) -> (D, D, D) {
        let params = Self::lift_parameters(parameters, Dual3::from_re);
        let t = Dual3::from_re(temperature);
        let (f, df, d2f, d3f) = third_derivative(
            |rho| Self::residual_helmholtz_energy_density(&params, t, rho),
            density,
        );
        (
            density * df - f + temperature * density,
            density * d2f + temperature,
            d2f + density * d3f,
        )
    }

    /// The residual chemical potential in units of K.
    fn residual_chemical_potential<D: DualNum<f64> + Copy>(
        parameters: &Self::Parameters<D>,
        temperature: D,
        density: D,
    ) -> D {
        let params = Self::lift_parameters(parameters, Dual::from_re);
        let t = Dual::from_re(temperature);
        let (_, mu_res) = first_derivative(
            |rho| Self::residual_helmholtz_energy_density(&params, t, rho),
            density,
        );
        mu_res
    }

    /// The residual entropy per molecule in units of k_B.
    fn residual_entropy<D: DualNum<f64> + Copy>(
        parameters: &Self::Parameters<D>,
        temperature: D,
        density: D,
    ) -> D {
        let params = Self::lift_parameters(parameters, Dual::from_re);
        let rho = Dual::from_re(density);
        let (_, da_dt) = first_derivative(
            |t| Self::residual_helmholtz_energy(&params, t, rho) * t,
            temperature,
        );
        -da_dt
    }

    /// The conditions for a pure-component critical point, dp/drho = 0 and
    /// d2p/drho2 = 0, both made dimensionless.
    fn criticality_conditions<D: DualNum<f64> + Copy>(
        parameters: &Self::Parameters<D>,
        temperature: D,
        density: D,
    ) -> [D; 2] {
        let (_, dp, d2p) = Self::p_dpdrho_d2pdrho2(parameters, temperature, density);
        [dp / temperature, d2p * density / temperature]
    }
}
