use crate::saftvrmie::parameters::SaftVRMiePars;
use num_dual::{Dual, DualNum};
use std::f64::consts::{FRAC_PI_6, PI};

#[derive(Debug)]
pub struct Properties<D> {
    /// Temperature dependent diameter
    diameter: D,
    /// number density of segments
    pub segment_density: D,
    /// packing fraction using d(T)
    zeta_x: D,
    /// packing fraction using sigma
    pub zeta_x_bar: D,
    /// k-values for HS pair correlation fn
    k0: [D; 4],
}

impl<D: DualNum<f64> + Copy> Properties<D> {
    pub(super) fn new(parameters: &SaftVRMiePars<D>, density: D, diameter: D) -> Self {
        let segment_density = density * parameters.m;
        let zeta_x = segment_density * diameter.powi(3) * FRAC_PI_6;
        let zeta_x_bar = segment_density * parameters.sigma.powi(3) * FRAC_PI_6;

        let frac_1mzeta3 = (-zeta_x + 1.0).powi(3).recip();
        let z = zeta_x;
        let z2 = z * z;
        let z3 = z2 * z;
        let k0 =
            -(-z + 1.0).ln() + z * (-z * 39.0 + z2 * 9.0 - z3 * 2.0 + 42.0) * frac_1mzeta3 / 6.0;
        let k1 = z * frac_1mzeta3 * 0.5 * (z3 + z * 6.0 - 12.0);
        let k2 = -z2 * 3.0 / 8.0 * frac_1mzeta3 * (-zeta_x + 1.0);
        let k3 = z * frac_1mzeta3 / 6.0 * (-z3 + z * 3.0 + 3.0);

        Self {
            diameter,
            segment_density,
            zeta_x,
            zeta_x_bar,
            k0: [k0, k1, k2, k3],
        }
    }
}

pub(super) const PHI: [[f64; 7]; 6] = [
    [
        7.5365557, -37.60463, 71.745953, -46.83552, -2.467982, -0.50272, 8.0956883,
    ],
    [-359.44, 1825.6, -3168.0, 1884.2, -0.82376, -3.1935, 3.709],
    [1550.9, -5070.1, 6534.6, -3288.7, -2.7171, 2.0883, 0.0],
    [
        -1.19932, 9.063632, -17.9482, 11.34027, 20.52142, -56.6377, 40.53683,
    ],
    [
        -1911.28, 21390.175, -51320.7, 37064.54, 1103.742, -3264.61, 2556.181,
    ],
    [
        9236.9, -129430.0, 357230.0, -315530.0, 1390.2, -4518.2, 4241.6,
    ],
];

/// Dispersion (first, second and third order perturbation) and chain
/// contributions per molecule divided by kT.
///
/// The perturbation terms a1 and a2 are evaluated with an additional dual
/// number in the segment density, because their derivatives enter the
/// pair correlation function of the chain term.
pub fn a_disp_chain<D: DualNum<f64> + Copy>(
    parameters: &SaftVRMiePars<D>,
    properties: &Properties<D>,
    temperature: D,
) -> [D; 2] {
    let p = parameters;
    let k = &properties.k0;
    let t_inv = temperature.recip();

    let eps_k = p.epsilon_k;
    let la = p.la;
    let lr = p.lr;
    let c = p.mie_prefactor();
    let alpha = p.alpha();
    let di = properties.diameter;
    let d3 = di.powi(3);

    // derivatives w.r.t. the segment density: d zeta_x / d rho_s = pi/6 d^3
    let rho_s_dual = Dual::new(properties.segment_density, D::one());
    let zeta_x_dual = Dual::new(properties.zeta_x, d3 * FRAC_PI_6);
    let k_hs_dual = (zeta_x_dual - 1.0).powi(4)
        / ((zeta_x_dual + zeta_x_dual.powi(2) - zeta_x_dual.powi(3)) * 4.0
            + zeta_x_dual.powi(4)
            + 1.0);

    // non-dual things
    let zeta_x_bar = properties.zeta_x_bar;
    let k_hs = k_hs_dual.re;

    let x0 = Dual::from_re(di.recip() * p.sigma);
    let la_dual = Dual::from_re(la);
    let lr_dual = Dual::from_re(lr);
    let pref = rho_s_dual * Dual::from_re(d3 * eps_k * c * 2.0 * PI);
    let a1s_b_la = a1s_b(zeta_x_dual, x0, la_dual);
    let a1s_b_lr = a1s_b(zeta_x_dual, x0, lr_dual);
    let a1s_b_2la = a1s_b(zeta_x_dual, x0, la_dual * 2.0);
    let a1s_b_lalr = a1s_b(zeta_x_dual, x0, la_dual + lr_dual);
    let a1s_b_2lr = a1s_b(zeta_x_dual, x0, lr_dual * 2.0);
    let a1 = pref * (a1s_b_la - a1s_b_lr);
    let a2 = pref
        * Dual::from_re(eps_k * c)
        * k_hs_dual
        * 0.5
        * (a1s_b_2la - a1s_b_lalr * 2.0 + a1s_b_2lr);

    // note indices of f(i, alpha) are shifted due to 0-indexing.
    let a3 = -zeta_x_bar
        * f(3, alpha)
        * (zeta_x_bar * (zeta_x_bar * f(5, alpha) + f(4, alpha))).exp()
        * eps_k.powi(3);
    let chi = zeta_x_bar * f(0, alpha)
        + zeta_x_bar.powi(5) * f(1, alpha)
        + zeta_x_bar.powi(8) * f(2, alpha);

    let a_disp = p.m
        * (a1.re * t_inv + a2.re * (chi + 1.0) * t_inv.powi(2) + a3 * t_inv.powi(3));

    // use dual-parts of a1 and a2 for derivatives
    // and real-parts of a1s_b-terms.
    let x0 = x0.re;
    let pref = d3 * eps_k * 2.0 * PI;
    let ln_g_hs = k[0] + k[1] * x0 + k[2] * x0.powi(2) + k[3] * x0.powi(3);
    let g_hs = ln_g_hs.exp();
    let g1 = a1.eps * 3.0 / pref - (a1s_b_la.re * la - a1s_b_lr.re * lr) * c;
    let g2_mca = a2.eps * 3.0 / pref / eps_k
        - (a1s_b_2lr.re * lr - a1s_b_lalr.re * (la + lr) + a1s_b_2la.re * la) * k_hs * c.powi(2);
    let beta_eps = t_inv * eps_k;
    let gamma = zeta_x_bar
        * beta_eps.exp_m1()
        * 10.0
        * (-((-alpha + 0.57) * 10.0).tanh() + 1.0)
        * (-zeta_x_bar * 6.7 - zeta_x_bar.powi(2) * 8.0).exp();
    let g2 = g2_mca * (gamma + 1.0);
    let ln_g_mie = ln_g_hs + (beta_eps * g1 + beta_eps.powi(2) * g2) / g_hs;
    let a_chain = -(p.m - 1.0) * ln_g_mie;

    [a_disp, a_chain]
}

#[inline]
pub(super) fn zeta_eff<D: DualNum<f64> + Copy>(zeta: D, lambda: D) -> D {
    let li = lambda.recip();
    let li2 = li * li;
    let li3 = li * li2;
    let c: [D; 4] =
        std::array::from_fn(|k| li * C[k][1] + li2 * C[k][2] + li3 * C[k][3] + C[k][0]);
    zeta * (zeta * (zeta * (zeta * c[3] + c[2]) + c[1]) + c[0])
}

/// Sutherland potential (Eq. A 16) divided by 2 PI rho_s d^3 epsilon_k
#[inline]
fn a1s<D: DualNum<f64> + Copy>(zeta_x: D, lambda: D) -> D {
    let zeta_eff = zeta_eff(zeta_x, lambda);
    -(-zeta_eff * 0.5 + 1.0) / ((-zeta_eff + 1.0).powi(3) * (lambda - 3.0))
}

/// Eq. A 12 of Lafitte divided by 2 PI rho_s d^3 epsilon_k
#[inline]
fn b<D: DualNum<f64> + Copy>(zeta_x: D, x0: D, lambda: D) -> D {
    let x0_3ml = x0.powd(-lambda + 3.0);
    let i = -(x0_3ml - 1.0) / (lambda - 3.0);
    let j = -(x0.powd(-lambda + 4.0) * (lambda - 3.0) - x0_3ml * (lambda - 4.0) - 1.0)
        / ((lambda - 3.0) * (lambda - 4.0));
    ((-zeta_x * 0.5 + 1.0) * i - zeta_x * (zeta_x + 1.0) * 4.5 * j) * (-zeta_x + 1.0).powi(-3)
}

/// Calculates x0^l (a1s + b) without prefactor C
#[inline]
fn a1s_b<D: DualNum<f64> + Copy>(zeta_x: D, x0: D, lambda: D) -> D {
    x0.powd(lambda) * (a1s(zeta_x, lambda) + b(zeta_x, x0, lambda))
}

fn f<D: DualNum<f64> + Copy>(k: usize, alpha: D) -> D {
    let alpha2 = alpha * alpha;
    let alpha3 = alpha * alpha2;
    let phi = PHI[k];
    (alpha * phi[1] + alpha2 * phi[2] + alpha3 * phi[3] + phi[0])
        / (alpha * phi[4] + alpha2 * phi[5] + alpha3 * phi[6] + 1.0)
}

const C: [[f64; 4]; 4] = [
    [0.81096, 1.7888, -37.578, 92.284],
    [1.0205, -19.341, 151.26, -463.50],
    [-1.9057, 22.845, -228.14, 973.92],
    [1.0885, -6.1962, 106.98, -677.64],
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saftvrmie::parameters::test_utils::test_parameters;
    use crate::saftvrmie::SaftVRMieOptions;
    use approx::assert_relative_eq;
    use num_dual::{first_derivative, Dual64};

    fn pars(name: &str) -> SaftVRMiePars<f64> {
        SaftVRMiePars::new(&test_parameters()[name], SaftVRMieOptions::default())
    }

    fn a_disp_chain_at(p: &SaftVRMiePars<f64>, temperature: f64, density: f64) -> [f64; 2] {
        let d = p.hs_diameter(temperature);
        let properties = Properties::new(p, density, d);
        a_disp_chain(p, &properties, temperature)
    }

    #[test]
    fn no_dispersion_at_zero_density() {
        let [a_disp, _] = a_disp_chain_at(&pars("propane"), 300.0, 0.0);
        assert_eq!(a_disp, 0.0);
    }

    #[test]
    fn no_chain_for_spherical_molecules() {
        let [a_disp, a_chain] = a_disp_chain_at(&pars("methane"), 200.0, 0.01);
        assert!(a_disp < 0.0);
        assert_eq!(a_chain, 0.0);
    }

    #[test]
    fn lennard_jones_chain_term_at_zero_density() {
        // g(sigma) -> exp(-beta u(sigma)) = 1 for rho -> 0 (up to the
        // accuracy of the perturbation expansion)
        let [_, a_chain] = a_disp_chain_at(&pars("octane"), 600.0, 1e-12);
        assert!(a_chain.abs() < 0.05);
    }

    #[test]
    fn dual_density_derivative() {
        // the dual number in the segment density must not interfere with
        // derivatives with respect to the (molecular) density
        let p = pars("hexane");
        let t = 400.0;
        let rho = 0.004;
        let p_dual = p.lift(Dual64::from_re);
        let (_, da) = first_derivative(
            |rho| {
                let d = p_dual.hs_diameter(Dual64::from_re(t));
                let properties = Properties::new(&p_dual, rho, d);
                let [a_disp, a_chain] = a_disp_chain(&p_dual, &properties, Dual64::from_re(t));
                a_disp + a_chain
            },
            rho,
        );
        let h = 1e-7;
        let [d1, c1] = a_disp_chain_at(&p, t, rho + h);
        let [d0, c0] = a_disp_chain_at(&p, t, rho - h);
        assert_relative_eq!(da, (d1 + c1 - d0 - c0) / (2.0 * h), max_relative = 1e-6);
    }
}
