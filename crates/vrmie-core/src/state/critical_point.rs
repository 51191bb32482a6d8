use super::State;
use crate::equation_of_state::{HelmholtzEnergyWrapper, ResidualHelmholtzEnergy};
use crate::errors::{EosError, EosResult};
use crate::{ReferenceSystem, SolverOptions};
use ndarray::Array1;
use num_dual::{Dual64, DualNum};
use quantity::{Density, Temperature};

const MAX_ITER_CRIT_POINT: usize = 50;
const TOL_CRIT_POINT: f64 = 1e-8;
const SCAN_POINTS: usize = 30;
const MAX_SCAN_STEPS: usize = 10;

/// # Critical points
impl<'a, E: ResidualHelmholtzEnergy, D: DualNum<f64> + Copy> State<'a, E, D> {
    /// Calculate the critical point of the pure substance.
    ///
    /// Without an initial temperature, the starting point is estimated by
    /// scanning the isotherms of the model for mechanical instabilities. If
    /// that fails, the Newton iteration is started from a set of trial
    /// temperatures.
    pub fn critical_point(
        eos: &'a HelmholtzEnergyWrapper<E, D>,
        initial_temperature: Option<Temperature>,
        options: SolverOptions,
    ) -> EosResult<Self> {
        let parameters = eos.re();
        let max_density = eos.eos.compute_max_density();
        let initial_density = 0.3 * max_density;

        let mut t_rho = None;
        if let Some(t) = initial_temperature {
            t_rho = Some(critical_point_hkm::<E>(
                &parameters,
                max_density,
                [t.into_reduced(), initial_density],
                options,
            )?);
        }
        if t_rho.is_none() {
            if let Some(guess) = critical_point_estimate(eos.eos.as_ref(), &parameters) {
                t_rho = critical_point_hkm::<E>(&parameters, max_density, guess, options).ok();
            }
        }
        for &t in [300.0, 700.0, 500.0].iter() {
            if t_rho.is_some() {
                break;
            }
            t_rho = critical_point_hkm::<E>(&parameters, max_density, [t, initial_density], options)
                .ok();
        }
        let [t, rho] = t_rho.ok_or(EosError::NotConverged(String::from("Critical point")))?;

        // implicit differentiation
        let (_, jac) = criticality_jacobian::<E>(&parameters, t, rho);
        let det = jac[0][0] * jac[1][1] - jac[0][1] * jac[1][0];
        let mut temperature = D::from(t);
        let mut density = D::from(rho);
        for _ in 0..D::NDERIV {
            let [f0, f1] = E::criticality_conditions(&eos.parameters, temperature, density);
            temperature -= (f0 * jac[1][1] - f1 * jac[0][1]) / det;
            density -= (f1 * jac[0][0] - f0 * jac[1][0]) / det;
        }
        Ok(Self::from_reduced(eos, temperature, density))
    }
}

/// Residuals of the criticality conditions and their Jacobian with
/// respect to temperature and density.
fn criticality_jacobian<E: ResidualHelmholtzEnergy>(
    parameters: &E::Parameters<f64>,
    temperature: f64,
    density: f64,
) -> ([f64; 2], [[f64; 2]; 2]) {
    let params = E::lift_parameters(parameters, Dual64::from_re);
    let t = Dual64::from_re(temperature);
    let rho = Dual64::from_re(density);
    let [dt0, dt1] = E::criticality_conditions(&params, Dual64::new(temperature, 1.0), rho);
    let [drho0, drho1] = E::criticality_conditions(&params, t, Dual64::new(density, 1.0));
    (
        [dt0.re, dt1.re],
        [[dt0.eps, drho0.eps], [dt1.eps, drho1.eps]],
    )
}

fn critical_point_hkm<E: ResidualHelmholtzEnergy>(
    parameters: &E::Parameters<f64>,
    max_density: f64,
    initial_values: [f64; 2],
    options: SolverOptions,
) -> EosResult<[f64; 2]> {
    let (max_iter, tol, verbosity) = options.unwrap_or(MAX_ITER_CRIT_POINT, TOL_CRIT_POINT);

    let [mut t, mut rho] = initial_values;

    log_iter!(
        verbosity,
        " iter |    residual    |   temperature   |       density        "
    );
    log_iter!(verbosity, "{:-<64}", "");
    log_iter!(
        verbosity,
        " {:4} |                | {:13.8} | {:12.8}",
        0,
        Temperature::from_reduced(t),
        Density::from_reduced(rho),
    );

    for i in 1..=max_iter {
        // calculate residuals and derivatives w.r.t. temperature and density
        let (res, jac) = criticality_jacobian::<E>(parameters, t, rho);
        let norm = res[0].hypot(res[1]);

        // calculate Newton step
        let det = jac[0][0] * jac[1][1] - jac[0][1] * jac[1][0];
        if det == 0.0 || !det.is_finite() {
            return Err(EosError::IterationFailed(String::from("Critical point")));
        }
        let mut delta = [
            (res[0] * jac[1][1] - res[1] * jac[0][1]) / det,
            (res[1] * jac[0][0] - res[0] * jac[1][0]) / det,
        ];

        // reduce step if necessary
        if delta[0].abs() > 0.25 * t {
            let f = 0.25 * t / delta[0].abs();
            delta = [delta[0] * f, delta[1] * f];
        }
        if delta[1].abs() > 0.03 * max_density {
            let f = 0.03 * max_density / delta[1].abs();
            delta = [delta[0] * f, delta[1] * f];
        }

        // apply step
        t -= delta[0];
        rho -= delta[1];
        rho = f64::max(rho, 1e-4 * max_density);

        log_iter!(
            verbosity,
            " {:4} | {:14.8e} | {:13.8} | {:12.8}",
            i,
            norm,
            Temperature::from_reduced(t),
            Density::from_reduced(rho),
        );

        if !t.is_finite() || !rho.is_finite() {
            break;
        }

        // check convergence
        if norm < tol {
            log_result!(
                verbosity,
                "Critical point calculation converged in {} step(s)\n",
                i
            );
            return Ok([t, rho]);
        }
    }
    Err(EosError::NotConverged(String::from("Critical point")))
}

/// Index of the first density on the grid at which the isotherm is
/// mechanically unstable.
fn first_unstable<E: ResidualHelmholtzEnergy>(
    parameters: &E::Parameters<f64>,
    temperature: f64,
    densities: &Array1<f64>,
) -> Option<usize> {
    densities.iter().position(|&rho| {
        let (_, _, dp_drho) = E::p_dpdrho(parameters, temperature, rho);
        dp_drho < 0.0
    })
}

/// Estimate the critical temperature and density by bracketing the
/// temperature at which the isotherms stop showing a van der Waals loop.
fn critical_point_estimate<E: ResidualHelmholtzEnergy>(
    eos: &E,
    parameters: &E::Parameters<f64>,
) -> Option<[f64; 2]> {
    let [t0, rho0] = eos.critical_point_scale()?;
    let densities = Array1::linspace(0.25 * rho0, 2.0 * rho0, SCAN_POINTS);

    let subcritical = first_unstable::<E>(parameters, t0, &densities).is_some();
    let dt = if subcritical { 0.5 * t0 } else { -0.1 * t0 };
    let mut t = t0;
    let mut bracket = None;
    for _ in 0..MAX_SCAN_STEPS {
        let t_new = t + dt;
        if t_new <= 0.0 {
            break;
        }
        let unstable = first_unstable::<E>(parameters, t_new, &densities);
        match (subcritical, unstable) {
            (true, None) => bracket = Some((t, t_new)),
            (false, Some(_)) => bracket = Some((t_new, t)),
            _ => (),
        }
        if bracket.is_some() {
            break;
        }
        t = t_new;
    }
    let (t_sub, t_sup) = bracket?;

    // unstable density interval at the subcritical temperature
    let start = first_unstable::<E>(parameters, t_sub, &densities)?;
    let unstable: Vec<f64> = densities
        .iter()
        .skip(start)
        .copied()
        .take_while(|&rho| E::p_dpdrho(parameters, t_sub, rho).2 < 0.0)
        .collect();
    let rho_min = unstable.first()?;
    let rho_max = unstable.last()?;
    Some([0.5 * (t_sub + t_sup), 0.5 * (rho_min + rho_max)])
}
