use crate::hard_sphere::packing_fraction;
use crate::saftvrmie::parameters::SaftVRMiePars;
use num_dual::DualNum;
use std::f64::consts::PI;

/// Bonding volume of two sites in units of Å³ (Dufal et al. 2015).
pub(super) fn bonding_volume<D: DualNum<f64> + Copy>(
    parameters: &SaftVRMiePars<D>,
    diameter: D,
) -> D {
    let rc = parameters.rc_ab * parameters.sigma;
    let rd = parameters.rd_ab * parameters.sigma;
    let d = diameter;
    let rc2 = rc * rc;
    let rd2 = rd * rd;

    let t1 = ((rc + rd * 2.0) / d).ln()
        * (rc2 * rc * 6.0 + rc2 * rd * 18.0 - rd2 * rd * 24.0);
    let t2 = (rc + rd * 2.0 - d)
        * (rd2 * 22.0 - rc * rd * 5.0 - rd * d * 7.0 - rc2 * 8.0 + rc * d + d * d);
    d * d * PI * 4.0 / (rc2 * 72.0) * (t1 + t2)
}

/// Association strength and its first and second derivative with respect
/// to density.
///
/// The contact value of the pair correlation function is approximated by
/// that of the hard-sphere fluid.
pub(super) fn association_strength<D: DualNum<f64> + Copy>(
    parameters: &SaftVRMiePars<D>,
    temperature: D,
    density: D,
    diameter: D,
) -> [D; 3] {
    let f = (parameters.epsilon_k_ab / temperature).exp_m1();
    let fk = f * bonding_volume(parameters, diameter);

    let deta = packing_fraction(parameters.m, diameter, D::one());
    let eta = deta * density;
    let frac_1meta = (-eta + 1.0).recip();
    let frac_1meta3 = frac_1meta.powi(3);

    let gd = (-eta * 0.5 + 1.0) * frac_1meta3;
    let dgd = (-eta + 2.5) * deta * frac_1meta3 * frac_1meta;
    let d2gd = (-eta + 3.0) * deta * deta * 3.0 * frac_1meta3 * frac_1meta * frac_1meta;
    [fk * gd, fk * dgd, fk * d2gd]
}
