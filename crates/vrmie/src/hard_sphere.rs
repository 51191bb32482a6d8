//! Hard-sphere contribution of a homosegmented chain fluid.
use num_dual::DualNum;
use std::f64::consts::FRAC_PI_6;

/// Packing fraction $\eta=\frac{\pi}{6}\rho m d^3$.
#[inline]
pub fn packing_fraction<D: DualNum<f64> + Copy>(m: D, diameter: D, density: D) -> D {
    density * m * diameter.powi(3) * FRAC_PI_6
}

/// Carnahan-Starling Helmholtz energy per molecule divided by kT.
pub fn helmholtz_energy<D: DualNum<f64> + Copy>(m: D, diameter: D, density: D) -> D {
    let eta = packing_fraction(m, diameter, density);
    let frac_1meta = (-eta + 1.0).recip();
    m * eta * (-eta * 3.0 + 4.0) * frac_1meta * frac_1meta
}
