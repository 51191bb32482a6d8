//! Translational ideal gas contribution.
use num_dual::DualNum;
use std::f64::consts::PI;

const PLANCK: f64 = 6.62607015e-34;
const KB: f64 = 1.380649e-23;
const NAV: f64 = 6.02214076e23;

/// Logarithm of the cubed thermal de Broglie wavelength $\ln\left(\Lambda^3/\mathrm{\AA^3}\right)$
/// of a molecule with molar weight `molarweight` (in g/mol).
pub fn ln_lambda3<D: DualNum<f64> + Copy>(molarweight: f64, temperature: D) -> D {
    let mass = molarweight * 1e-3 / NAV;
    // h^2 / (2 pi m k_B) in units of Å^2 K
    let f = PLANCK * PLANCK * 1e20 / (2.0 * PI * mass * KB);
    (temperature.recip() * f).ln() * 1.5
}
