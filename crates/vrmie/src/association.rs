//! Association contribution of a self-associating pure substance.
//!
//! Sites are grouped into three types: bipolar sites (B) bond with all
//! sites, positive sites (P) bond with negative (N) and bipolar sites and
//! vice versa. The association strength is the same for all bonding pairs,
//! so the model only requires the site configuration and a (density
//! dependent) association strength.
use nalgebra::{DMatrix, DVector};
use num_dual::linalg::LU;
use num_dual::DualNum;
use vrmie_core::{EosError, EosResult};

/// Number of damped successive substitution steps before the Newton solver.
const SUCCESSIVE_SUBSTITUTION: usize = 5;
/// Damping of the successive substitution.
const OMEGA: f64 = 0.2;
/// Initial value of the site fractions.
const X0: f64 = 0.2;

/// Site configuration of an associating substance.
#[derive(Clone, Debug)]
pub struct AssociationSites {
    /// Number of sites of every site type with non-zero multiplicity.
    pub multiplicity: DVector<f64>,
    /// `dij[(i, j)]` is the number of sites of type `j` that a site of type `i` can bond with.
    pub dij: DMatrix<f64>,
}

impl AssociationSites {
    /// Site configuration from the number of sites of type [B, P, N].
    pub fn new(sites: [usize; 3]) -> Self {
        let types: Vec<(usize, f64)> = sites
            .iter()
            .enumerate()
            .filter(|(_, &n)| n > 0)
            .map(|(t, &n)| (t, n as f64))
            .collect();
        let n = types.len();
        let multiplicity = DVector::from_fn(n, |i, _| types[i].1);
        let dij = DMatrix::from_fn(n, n, |i, j| {
            let (ti, _) = types[i];
            let (tj, nj) = types[j];
            let interact = match (ti, tj) {
                (0, _) | (_, 0) => true,
                (1, 2) | (2, 1) => true,
                _ => false,
            };
            if interact {
                nj
            } else {
                0.0
            }
        });
        Self { multiplicity, dij }
    }

    pub fn len(&self) -> usize {
        self.multiplicity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.multiplicity.is_empty()
    }
}

/// Solver for the fraction of non-bonded sites and the resulting
/// Helmholtz energy.
#[derive(Clone, Debug)]
pub struct Association {
    pub sites: AssociationSites,
    max_iter: usize,
    tol: f64,
}

impl Association {
    pub fn new(sites: [usize; 3], max_iter: usize, tol: f64) -> Self {
        Self {
            sites: AssociationSites::new(sites),
            max_iter,
            tol,
        }
    }

    /// $\sum_j D_{ij}v_j$ for every site type.
    fn bonding_sum<D: DualNum<f64> + Copy>(&self, v: &DVector<D>) -> DVector<D> {
        let n = self.sites.len();
        DVector::from_fn(n, |i, _| {
            (0..n).fold(D::zero(), |acc, j| acc + v[j] * self.sites.dij[(i, j)])
        })
    }

    /// Fractions of non-bonded sites for the product of density and
    /// association strength `rho_delta`.
    ///
    /// A few damped successive substitution steps are followed by a
    /// Newton iteration with clipping of non-physical iterates.
    pub fn site_fractions(&self, rho_delta: f64) -> EosResult<DVector<f64>> {
        self.solve_site_fractions(rho_delta, DVector::from_element(self.sites.len(), X0))
    }

    fn solve_site_fractions(
        &self,
        rho_delta: f64,
        mut x: DVector<f64>,
    ) -> EosResult<DVector<f64>> {
        let k = &self.sites.dij * rho_delta;

        for _ in 0..SUCCESSIVE_SUBSTITUTION {
            let kx = &k * &x;
            let fo = kx.map(|kx| 1.0 / (1.0 + kx));
            x += (fo - &x) * (1.0 - OMEGA);
        }

        let (mut dq, mut h) = Self::gradient_hessian(&k, &x);
        for _ in 0..self.max_iter {
            let dx = h
                .lu()
                .solve(&(-&dq))
                .ok_or_else(|| EosError::IterationFailed(String::from("Association")))?;
            x = x.zip_map(&dx, |x, dx| clip(x + dx, x));

            (dq, h) = Self::gradient_hessian(&k, &x);
            if dq.norm() < self.tol {
                return Ok(x);
            }
        }
        Err(EosError::NotConverged(String::from("Association")))
    }

    fn gradient_hessian(k: &DMatrix<f64>, x: &DVector<f64>) -> (DVector<f64>, DMatrix<f64>) {
        let kx = k * x;
        let dq = x.map(|x| 1.0 / x - 1.0) - &kx;
        let mut h = -k;
        for i in 0..x.len() {
            h[(i, i)] -= (1.0 + kx[i]) / x[i];
        }
        (dq, h)
    }

    /// Residual $X_i-\frac{1}{1+\rho\Delta\sum_jD_{ij}X_j}$ of given site fractions.
    pub fn residual(&self, rho_delta: f64, x: &DVector<f64>) -> DVector<f64> {
        let kx = self.bonding_sum(x).map(|s| s * rho_delta);
        DVector::from_fn(x.len(), |i, _| x[i] - 1.0 / (1.0 + kx[i]))
    }

    /// Newton step on the site fractions without clipping, used to
    /// propagate derivatives through the converged solution.
    fn newton_step<D: DualNum<f64> + Copy>(
        &self,
        x: &mut DVector<D>,
        rho_delta: D,
    ) -> EosResult<()> {
        let n = x.len();
        let kx = self.bonding_sum(x).map(|s| s * rho_delta);
        let g = DVector::from_fn(n, |i, _| x[i].recip() - 1.0 - kx[i]);
        let h = DMatrix::from_fn(n, n, |i, j| {
            let h = -rho_delta * self.sites.dij[(i, j)];
            if i == j {
                h - (kx[i] + 1.0) / x[i]
            } else {
                h
            }
        });
        let delta_x = LU::new(h)?.solve(&g);
        x.iter_mut().zip(&delta_x).for_each(|(x, &dx)| *x -= dx);
        Ok(())
    }

    /// Site fractions in the data type of the density and association strength.
    pub fn site_fractions_dual<D: DualNum<f64> + Copy>(
        &self,
        density: D,
        delta: D,
    ) -> EosResult<DVector<D>> {
        let rho_delta = density * delta;
        let x = self.site_fractions(rho_delta.re())?;
        let mut x = x.map(D::from);
        for _ in 0..D::NDERIV {
            self.newton_step(&mut x, rho_delta)?;
        }
        Ok(x)
    }

    /// Helmholtz energy per molecule divided by kT.
    pub fn helmholtz_energy<D: DualNum<f64> + Copy>(&self, density: D, delta: D) -> EosResult<D> {
        let x = self.site_fractions_dual(density, delta)?;
        Ok(self
            .sites
            .multiplicity
            .iter()
            .zip(x.iter())
            .fold(D::zero(), |acc, (&s, &x)| acc + (x.ln() - x * 0.5 + 0.5) * s))
    }

    /// Site fractions and their first and second derivatives with respect
    /// to density.
    ///
    /// `delta` contains the association strength and its first and second
    /// derivative with respect to density.
    pub fn site_fraction_derivatives<D: DualNum<f64> + Copy>(
        &self,
        density: D,
        delta: [D; 3],
    ) -> EosResult<[DVector<D>; 3]> {
        let n = self.sites.len();
        let [delta, d_delta, d2_delta] = delta;
        let x = self.site_fractions_dual(density, delta)?;
        let x2 = x.component_mul(&x);

        // C = I + rho diag(X^2) (DIJ Delta)
        let c = DMatrix::from_fn(n, n, |i, j| {
            let c = x2[i] * density * delta * self.sites.dij[(i, j)];
            if i == j {
                c + 1.0
            } else {
                c
            }
        });
        let lu = LU::new(c)?;

        let sum_x = self.bonding_sum(&x);
        let b1 = DVector::from_fn(n, |i, _| -x2[i] * sum_x[i] * (delta + density * d_delta));
        let dx = lu.solve(&b1);

        let sum_dx = self.bonding_sum(&dx);
        let b2 = DVector::from_fn(n, |i, _| {
            dx[i] * dx[i] * 2.0 / x[i]
                - x2[i]
                    * (sum_x[i] * (d_delta * 2.0 + density * d2_delta)
                        + sum_dx[i] * (delta + density * d_delta) * 2.0)
        });
        let d2x = lu.solve(&b2);
        Ok([x, dx, d2x])
    }

    /// Helmholtz energy per molecule divided by kT and its first and
    /// second derivative with respect to density.
    pub fn helmholtz_energy_derivatives<D: DualNum<f64> + Copy>(
        &self,
        density: D,
        delta: [D; 3],
    ) -> EosResult<[D; 3]> {
        let [x, dx, d2x] = self.site_fraction_derivatives(density, delta)?;
        let mut a = [D::zero(); 3];
        for (i, &s) in self.sites.multiplicity.iter().enumerate() {
            let x_inv = x[i].recip();
            a[0] += (x[i].ln() - x[i] * 0.5 + 0.5) * s;
            a[1] += dx[i] * (x_inv - 0.5) * s;
            a[2] += (d2x[i] * (x_inv - 0.5) - dx[i] * dx[i] * x_inv * x_inv) * s;
        }
        Ok(a)
    }
}

/// Keeps a Newton iterate of a site fraction within (0, 1].
fn clip(x_new: f64, x_old: f64) -> f64 {
    if x_new.is_nan() {
        X0
    } else if x_new < 0.0 {
        0.2 * x_old
    } else {
        x_new.min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_dual::{second_derivative, Dual2_64};

    #[test]
    fn site_configuration() {
        let sites = AssociationSites::new([0, 1, 1]);
        assert_eq!(sites.multiplicity, DVector::from_vec(vec![1.0, 1.0]));
        assert_eq!(sites.dij, DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]));

        let sites = AssociationSites::new([0, 2, 2]);
        assert_eq!(sites.dij, DMatrix::from_row_slice(2, 2, &[0.0, 2.0, 2.0, 0.0]));

        let sites = AssociationSites::new([1, 0, 0]);
        assert_eq!(sites.dij, DMatrix::from_element(1, 1, 1.0));

        let sites = AssociationSites::new([2, 1, 0]);
        assert_eq!(sites.multiplicity, DVector::from_vec(vec![2.0, 1.0]));
        assert_eq!(sites.dij, DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 2.0, 0.0]));

        assert!(AssociationSites::new([0, 0, 0]).is_empty());
    }

    #[test]
    fn two_site_analytic_solution() -> EosResult<()> {
        let assoc = Association::new([0, 1, 1], 15, 1e-9);
        for rho_delta in [1e-3, 0.5, 10.0, 500.0] {
            let x = assoc.site_fractions(rho_delta)?;
            let x_analytic = ((1.0 + 4.0 * rho_delta).sqrt() - 1.0) / (2.0 * rho_delta);
            assert_relative_eq!(x[0], x_analytic, max_relative = 1e-8);
            assert_relative_eq!(x[1], x_analytic, max_relative = 1e-8);
            assert!(assoc.residual(rho_delta, &x).norm() < 1e-8);
        }
        Ok(())
    }

    #[test]
    fn clipping() {
        assert_eq!(clip(f64::NAN, 0.5), X0);
        assert_eq!(clip(-0.3, 0.5), 0.1);
        assert_eq!(clip(1.7, 0.5), 1.0);
        assert_eq!(clip(0.4, 0.5), 0.4);
    }

    #[test]
    fn start_far_from_solution() -> EosResult<()> {
        let assoc = Association::new([0, 2, 2], 15, 1e-9);
        for rho_delta in [20.0, 1e4] {
            let x = assoc.solve_site_fractions(rho_delta, DVector::from_element(2, 1.0))?;
            let x_analytic = ((1.0 + 8.0 * rho_delta).sqrt() - 1.0) / (4.0 * rho_delta);
            assert_relative_eq!(x[0], x_analytic, max_relative = 1e-8);
            assert_relative_eq!(x[1], x_analytic, max_relative = 1e-8);
        }
        Ok(())
    }

    #[test]
    fn not_converged() {
        let assoc = Association::new([0, 2, 2], 15, 0.0);
        assert!(matches!(
            assoc.site_fractions(20.0),
            Err(EosError::NotConverged(_))
        ));
    }

    #[test]
    fn zero_density() -> EosResult<()> {
        let assoc = Association::new([0, 1, 1], 15, 1e-9);
        assert_relative_eq!(assoc.helmholtz_energy(0.0, 100.0)?, 0.0, epsilon = 1e-14);

        // the density derivatives of the dual number path do not vanish at zero density
        let (a, da, d2a) = second_derivative(
            |rho| assoc.helmholtz_energy(rho, delta(rho)).unwrap(),
            0.0,
        );
        let d = delta(Dual2_64::from_re(0.0).derivative());
        let a_analytic = assoc.helmholtz_energy_derivatives(0.0, [d.re, d.v1, d.v2])?;
        assert_relative_eq!(a, a_analytic[0], epsilon = 1e-14);
        assert_relative_eq!(da, -2.0 * d.re * 0.5, max_relative = 1e-10);
        assert_relative_eq!(da, a_analytic[1], max_relative = 1e-10);
        assert_relative_eq!(d2a, a_analytic[2], max_relative = 1e-8);
        Ok(())
    }

    fn delta(rho: Dual2_64) -> Dual2_64 {
        // any smooth, increasing function of density
        (rho * 40.0 + 1.0) * 150.0 + rho * rho * 3000.0
    }

    #[test]
    fn density_derivatives() -> EosResult<()> {
        for sites in [[0, 1, 1], [0, 2, 2], [1, 0, 0], [2, 1, 2]] {
            let assoc = Association::new(sites, 15, 1e-12);
            let rho = 0.012;
            let (a, da, d2a) = second_derivative(
                |rho| assoc.helmholtz_energy(rho, delta(rho)).unwrap(),
                rho,
            );
            let d = delta(Dual2_64::from_re(rho).derivative());
            let a_analytic = assoc.helmholtz_energy_derivatives(rho, [d.re, d.v1, d.v2])?;
            assert_relative_eq!(a, a_analytic[0], max_relative = 1e-10);
            assert_relative_eq!(da, a_analytic[1], max_relative = 1e-8);
            assert_relative_eq!(d2a, a_analytic[2], max_relative = 1e-6);
        }
        Ok(())
    }
}
