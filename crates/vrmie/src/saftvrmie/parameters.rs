use super::SaftVRMieOptions;
use num_dual::DualNum;
use serde::{Deserialize, Serialize};
use std::fmt;
use vrmie_core::parameter::PureRecord;

/// 10-point Gauss-Legendre quadrature [position, weight]
const GLQ10: [[f64; 2]; 10] = [
    [-0.1488743389816312, 0.2955242247147529],
    [0.1488743389816312, 0.2955242247147529],
    [-0.4333953941292472, 0.2692667193099963],
    [0.4333953941292472, 0.2692667193099963],
    [-0.6794095682990244, 0.219086362515982],
    [0.6794095682990244, 0.219086362515982],
    [-0.8650633666889845, 0.1494513491505806],
    [0.8650633666889845, 0.1494513491505806],
    [-0.9739065285171717, 0.0666713443086881],
    [0.9739065285171717, 0.0666713443086881],
];

fn default_la() -> f64 {
    6.0
}

fn default_rd_ab() -> f64 {
    0.4
}

/// Association parameters of a self-associating substance.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SaftVRMieAssociationRecord {
    /// Association energy in units of Kelvin
    pub epsilon_k_ab: f64,
    /// Cut-off distance of the site-site potential divided by sigma
    pub rc_ab: f64,
    /// Distance of the sites from the center of the segment divided by sigma
    #[serde(default = "default_rd_ab")]
    pub rd_ab: f64,
    /// Number of sites of type [B, P, N]
    pub sites: [usize; 3],
}

impl SaftVRMieAssociationRecord {
    pub fn new(epsilon_k_ab: f64, rc_ab: f64, rd_ab: Option<f64>, sites: [usize; 3]) -> Self {
        Self {
            epsilon_k_ab,
            rc_ab,
            rd_ab: rd_ab.unwrap_or_else(default_rd_ab),
            sites,
        }
    }
}

impl fmt::Display for SaftVRMieAssociationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SaftVRMieAssociationRecord(epsilon_k_ab={}", self.epsilon_k_ab)?;
        write!(f, ", rc_ab={}", self.rc_ab)?;
        write!(f, ", rd_ab={}", self.rd_ab)?;
        write!(f, ", sites={:?})", self.sites)
    }
}

/// SAFT-VR Mie pure-component parameters.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SaftVRMieRecord {
    /// Segment number
    pub m: f64,
    /// Segment diameter in units of Angstrom
    pub sigma: f64,
    /// Energetic parameter in units of Kelvin
    pub epsilon_k: f64,
    /// Repulsive Mie exponent
    pub lr: f64,
    /// Attractive Mie exponent
    #[serde(default = "default_la")]
    pub la: f64,
    /// Association
    #[serde(flatten)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub association_record: Option<SaftVRMieAssociationRecord>,
}

impl SaftVRMieRecord {
    pub fn new(
        m: f64,
        sigma: f64,
        epsilon_k: f64,
        lr: f64,
        la: f64,
        association_record: Option<SaftVRMieAssociationRecord>,
    ) -> Self {
        Self {
            m,
            sigma,
            epsilon_k,
            lr,
            la,
            association_record,
        }
    }

    /// A record without association parameters.
    pub fn new_simple(m: f64, sigma: f64, epsilon_k: f64, lr: f64, la: f64) -> Self {
        Self::new(m, sigma, epsilon_k, lr, la, None)
    }
}

impl fmt::Display for SaftVRMieRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SaftVRMieRecord(m={}", self.m)?;
        write!(f, ", sigma={}", self.sigma)?;
        write!(f, ", epsilon_k={}", self.epsilon_k)?;
        write!(f, ", lr={}", self.lr)?;
        write!(f, ", la={}", self.la)?;
        if let Some(n) = &self.association_record {
            write!(f, ", association_record={}", n)?;
        }
        write!(f, ")")
    }
}

/// Parameters of the model in a (possibly dual) number type.
///
/// The numbers of association sites, the molar weight and the solver
/// options cannot carry derivatives.
#[derive(Clone, Copy, Debug)]
pub struct SaftVRMiePars<D> {
    pub m: D,
    pub sigma: D,
    pub epsilon_k: D,
    pub lr: D,
    pub la: D,
    pub epsilon_k_ab: D,
    pub rc_ab: D,
    pub rd_ab: D,
    pub sites: [usize; 3],
    pub molarweight: f64,
    pub options: SaftVRMieOptions,
}

impl<D: DualNum<f64> + Copy> SaftVRMiePars<D> {
    pub fn new(record: &PureRecord<SaftVRMieRecord>, options: SaftVRMieOptions) -> Self {
        let r = &record.model_record;
        let (epsilon_k_ab, rc_ab, rd_ab, sites) = match &r.association_record {
            Some(a) => (a.epsilon_k_ab, a.rc_ab, a.rd_ab, a.sites),
            None => (0.0, 0.0, default_rd_ab(), [0; 3]),
        };
        Self {
            m: D::from(r.m),
            sigma: D::from(r.sigma),
            epsilon_k: D::from(r.epsilon_k),
            lr: D::from(r.lr),
            la: D::from(r.la),
            epsilon_k_ab: D::from(epsilon_k_ab),
            rc_ab: D::from(rc_ab),
            rd_ab: D::from(rd_ab),
            sites,
            molarweight: record.molarweight,
            options,
        }
    }

    /// Map every parameter into another number type.
    pub fn lift<D2: DualNum<f64> + Copy, F: Fn(D) -> D2>(&self, f: F) -> SaftVRMiePars<D2> {
        SaftVRMiePars {
            m: f(self.m),
            sigma: f(self.sigma),
            epsilon_k: f(self.epsilon_k),
            lr: f(self.lr),
            la: f(self.la),
            epsilon_k_ab: f(self.epsilon_k_ab),
            rc_ab: f(self.rc_ab),
            rd_ab: f(self.rd_ab),
            sites: self.sites,
            molarweight: self.molarweight,
            options: self.options,
        }
    }

    /// Whether the substance has association sites.
    pub fn is_associating(&self) -> bool {
        self.sites.iter().any(|&n| n > 0)
    }

    /// Prefactor of the Mie potential.
    pub fn mie_prefactor(&self) -> D {
        mie_prefactor(self.lr, self.la)
    }

    /// Van der Waals-like attractive constant of the Mie potential.
    pub fn alpha(&self) -> D {
        self.mie_prefactor() * ((self.la - 3.0).recip() - (self.lr - 3.0).recip())
    }

    /// Barker-Henderson diameter in units of Angstrom.
    pub fn hs_diameter(&self, temperature: D) -> D {
        let c_eps_t = self.mie_prefactor() * self.epsilon_k / temperature;

        // perform integration in reduced distances, then multiply sigma
        // r0 is dimensionless
        let r0 = lower_integratal_limit(self.la, self.lr, c_eps_t);
        let width = (-r0 + 1.0) * 0.5;
        GLQ10.iter().fold(r0, |d, &[x, w]| {
            let r = width * x + width + r0;
            let u = beta_u_mie(r, self.la, self.lr, c_eps_t);
            let f_u = -(-u).exp_m1();
            d + width * f_u * w
        }) * self.sigma
    }
}

#[inline]
pub(super) fn mie_prefactor<D: DualNum<f64> + Copy>(lr: D, la: D) -> D {
    lr / (lr - la) * (lr / la).powd(la / (lr - la))
}

/// Find lower limit for integration of the temperature dependent diameter
///
/// Method of Aasen et al.
/// Starting value from the repulsive part of the potential.
fn lower_integratal_limit<D: DualNum<f64> + Copy>(la: D, lr: D, c_eps_t: D) -> D {
    let k = (-c_eps_t.recip() * f64::EPSILON.ln()).ln();
    let mut r = (-k / lr).exp();
    // Halley's method
    for _ in 1..5 {
        let [u, u_du, du_d2u] = mie_potential_halley(r, la, lr, c_eps_t);
        let dr = u_du / (-u_du / du_d2u * 0.5 + 1.0);
        if u.re() < 0.0 {
            return r;
        }
        r -= dr;
    }
    r
}

/// Calculate the fractions f / df and df / d2f used for Halley's method,
///
/// f is the function to find the root of.
/// Here, f = -beta u_mie(r) - ln(EPS)
#[inline]
fn mie_potential_halley<D: DualNum<f64> + Copy>(r: D, la: D, lr: D, c_eps_t: D) -> [D; 3] {
    let ri = r.recip();
    let plr = ri.powd(lr);
    let pla = ri.powd(la);
    let u = plr - pla;
    let dplr = plr * (-lr) * ri;
    let dpla = pla * (-la) * ri;
    let du_dr = dplr - dpla;
    let d2u_dr2 = (dplr * (-lr - 1.0) - dpla * (-la - 1.0)) * ri;

    let f = -c_eps_t * u - f64::EPSILON.ln();
    let df = -c_eps_t * du_dr;
    let d2f = -c_eps_t * d2u_dr2;
    [f, f / df, df / d2f]
}

/// Dimensionless Mie potential (divided by kT) at reduced distance r/sigma
#[inline]
fn beta_u_mie<D: DualNum<f64> + Copy>(r: D, la: D, lr: D, c_eps_t: D) -> D {
    let ri = r.recip();
    (ri.powd(lr) - ri.powd(la)) * c_eps_t
}

/// Utilities for running tests
#[doc(hidden)]
pub mod test_utils {
    use super::*;
    use std::collections::HashMap;
    use vrmie_core::parameter::Identifier;

    fn record(name: &str, molarweight: f64, model_record: SaftVRMieRecord) -> PureRecord<SaftVRMieRecord> {
        PureRecord::new(Identifier::from_name(name), molarweight, model_record)
    }

    /// Parameters from Lafitte et al. (2013) and Dufal et al. (2015)
    pub fn test_parameters() -> HashMap<&'static str, PureRecord<SaftVRMieRecord>> {
        let mut parameters = HashMap::new();
        let simple = [
            ("methane", 16.031, [1.0, 3.7412, 153.36, 12.65, 6.0]),
            ("ethane", 30.047, [1.4373, 3.7257, 206.12, 12.4, 6.0]),
            ("propane", 44.063, [1.6845, 3.9056, 239.89, 13.006, 6.0]),
            ("n-butane", 58.078, [1.8514, 4.0887, 273.64, 13.65, 6.0]),
            ("pentane", 72.094, [1.9606, 4.2928, 321.94, 15.847, 6.0]),
            ("hexane", 86.11, [2.1097, 4.423, 354.38, 17.203, 6.0]),
            ("heptane", 100.125, [2.3949, 4.4282, 358.51, 17.092, 6.0]),
            ("octane", 114.141, [2.6253, 4.4696, 369.18, 17.378, 6.0]),
            ("decane", 142.172, [2.9976, 4.589, 400.79, 18.885, 6.0]),
            ("carbon dioxide", 43.99, [1.5, 3.1916, 231.88, 27.557, 5.1646]),
            ("benzene", 78.047, [1.9163, 4.0549, 372.59, 14.798, 6.0]),
            ("toluene", 92.063, [1.9977, 4.2777, 409.73, 16.334, 6.0]),
        ];
        for (name, mw, [m, sigma, epsilon_k, lr, la]) in simple {
            parameters.insert(
                name,
                record(name, mw, SaftVRMieRecord::new_simple(m, sigma, epsilon_k, lr, la)),
            );
        }

        parameters.insert(
            "methanol",
            record(
                "methanol",
                32.026,
                SaftVRMieRecord::new(
                    1.5283,
                    3.3063,
                    167.72,
                    8.6556,
                    6.0,
                    Some(SaftVRMieAssociationRecord::new(
                        2904.7,
                        0.41314,
                        None,
                        [0, 1, 1],
                    )),
                ),
            ),
        );

        parameters.insert(
            "water",
            record(
                "water",
                18.01528,
                SaftVRMieRecord::new(
                    1.7311,
                    2.4539,
                    110.85,
                    8.308,
                    6.0,
                    Some(SaftVRMieAssociationRecord::new(
                        1991.07,
                        0.5624,
                        Some(0.4),
                        [0, 2, 2],
                    )),
                ),
            ),
        );

        parameters
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::test_parameters;
    use super::*;
    use approx::assert_relative_eq;
    use num_dual::Dual2;

    fn ethane() -> SaftVRMiePars<f64> {
        SaftVRMiePars::new(&test_parameters()["ethane"], SaftVRMieOptions::default())
    }

    #[test]
    fn test_mie_potential() {
        let la = Dual2::from_re(6.0);
        let lr = Dual2::from_re(12.0);
        let c_eps_t = Dual2::from_re(4.0);
        let r = 0.9;
        let rd = Dual2::from_re(r).derivative();
        let u = beta_u_mie(rd, la, lr, c_eps_t);
        let [_, u_du, du_d2u] = mie_potential_halley(r, 6.0, 12.0, 4.0);
        assert_relative_eq!((-u.re - f64::EPSILON.ln()) / -u.v1, u_du);
        assert_relative_eq!(u.v1 / u.v2, du_d2u);
    }

    #[test]
    fn hs_diameter_ethane() {
        let d_hs = ethane().hs_diameter(50.0);
        assert_relative_eq!(
            3.694019351651498,
            d_hs,
            max_relative = 1e-9,
            epsilon = 1e-9
        )
    }

    #[test]
    fn test_zero_integrant() {
        let temperature = 50.0;
        let p = ethane();
        let c_eps_t = p.mie_prefactor() * p.epsilon_k / temperature;
        let r0 = lower_integratal_limit(p.la, p.lr, c_eps_t);
        assert_relative_eq!(
            (-beta_u_mie(r0, p.la, p.lr, c_eps_t)).exp(),
            f64::EPSILON,
            max_relative = 1e-14,
            epsilon = 1e-15
        )
    }

    #[test]
    fn lennard_jones_prefactor() {
        assert_relative_eq!(mie_prefactor(12.0, 6.0), 4.0, max_relative = 1e-14);
    }

    #[test]
    fn hs_diameter_below_sigma() {
        let p = ethane();
        for t in [100.0, 300.0, 1000.0] {
            let d = p.hs_diameter(t);
            assert!(d < p.sigma && d > 0.8 * p.sigma);
        }
        assert!(p.hs_diameter(1000.0) < p.hs_diameter(100.0));
    }

    #[test]
    fn association_record_from_json() {
        let json = r#"{
            "identifier": {"name": "water"},
            "molarweight": 18.01528,
            "m": 1.7311,
            "sigma": 2.4539,
            "epsilon_k": 110.85,
            "lr": 8.308,
            "epsilon_k_ab": 1991.07,
            "rc_ab": 0.5624,
            "sites": [0, 2, 2]
        }"#;
        let record: PureRecord<SaftVRMieRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(record.model_record.la, 6.0);
        let association = record.model_record.association_record.unwrap();
        assert_eq!(association.rd_ab, 0.4);
        assert_eq!(association.sites, [0, 2, 2]);

        let json = r#"{
            "identifier": {"name": "methane"},
            "molarweight": 16.031,
            "m": 1.0,
            "sigma": 3.7412,
            "epsilon_k": 153.36,
            "lr": 12.65
        }"#;
        let record: PureRecord<SaftVRMieRecord> = serde_json::from_str(json).unwrap();
        assert!(record.model_record.association_record.is_none());
    }
}
