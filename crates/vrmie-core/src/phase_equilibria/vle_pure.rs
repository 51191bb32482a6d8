use super::{PhaseEquilibrium, TRIVIAL_REL_DEVIATION};
use crate::density_iteration::{_density_iteration, _pressure_spinodal};
use crate::equation_of_state::{HelmholtzEnergyWrapper, ResidualHelmholtzEnergy};
use crate::errors::{EosError, EosResult};
use crate::state::{Contributions, DensityInitialization, State};
use crate::{ReferenceSystem, SolverOptions};
use num_dual::{Dual64, DualNum};
use quantity::{Density, Pressure, Temperature};

const MAX_ITER_PURE: usize = 50;
const TOL_PURE: f64 = 1e-12;
const TOL_PURE_P: f64 = 1e-10;

/// # Pure component phase equilibria
impl<'a, E: ResidualHelmholtzEnergy, D: DualNum<f64> + Copy> PhaseEquilibrium<'a, E, D> {
    /// Calculate a phase equilibrium for a pure component
    /// and given temperature.
    pub fn pure_t(
        eos: &'a HelmholtzEnergyWrapper<E, D>,
        temperature: Temperature<D>,
        initial_state: Option<&Self>,
        options: SolverOptions,
    ) -> EosResult<Self> {
        let parameters = eos.re();
        let max_density = eos.eos.compute_max_density();
        let t = temperature.into_reduced();
        let solve =
            |start: (f64, [f64; 2])| iterate_pure_t::<E>(&parameters, t.re(), start, options);

        // starting points in order of preference: the given equilibrium,
        // an ideal gas vapor phase and finally the two spinodals
        let from_initial_state = initial_state.and_then(|init| {
            let p = init.vapor().pressure(Contributions::Total).into_reduced().re();
            let densities = [
                init.vapor().reduced_density.re(),
                init.liquid().reduced_density.re(),
            ];
            solve((p, densities)).ok()
        });
        let (_, [rho_v, rho_l]) = match from_initial_state
            .or_else(|| solve(ideal_gas_start::<E>(&parameters, max_density, t.re())).ok())
        {
            Some(vle) => vle,
            None => solve(spinodal_start::<E>(&parameters, max_density, t.re())?)?,
        };

        // Implicit differentiation
        let [mut rho_v, mut rho_l] = [D::from(rho_v), D::from(rho_l)];
        for _ in 0..D::NDERIV {
            let (a_v, p_v, dp_v) = E::p_dpdrho(&eos.parameters, t, rho_v);
            let (a_l, p_l, dp_l) = E::p_dpdrho(&eos.parameters, t, rho_l);
            let p = coexistence_pressure(t, [rho_v, rho_l], [a_v, a_l]);
            rho_v += (p - p_v) / dp_v;
            rho_l += (p - p_l) / dp_l;
        }
        Ok(Self([
            State::from_reduced(eos, t, rho_v),
            State::from_reduced(eos, t, rho_l),
        ]))
    }
}

/// Pressure at which both phases have the same Gibbs energy, if the
/// densities were kept fixed.
fn coexistence_pressure<D: DualNum<f64> + Copy>(
    t: D,
    [rho_v, rho_l]: [D; 2],
    [a_v, a_l]: [D; 2],
) -> D {
    let (v_v, v_l) = (rho_v.recip(), rho_l.recip());
    (a_v * v_v - a_l * v_l + t * (rho_v / rho_l).ln()) / (v_l - v_v)
}

fn iterate_pure_t<E: ResidualHelmholtzEnergy>(
    parameters: &E::Parameters<f64>,
    temperature: f64,
    (mut pressure, [mut rho_v, mut rho_l]): (f64, [f64; 2]),
    options: SolverOptions,
) -> EosResult<(f64, [f64; 2])> {
    const MAX_ITER_INNER: usize = 20;
    let (max_iter, tol, verbosity) = options.unwrap_or(MAX_ITER_PURE, TOL_PURE);

    log_iter!(
        verbosity,
        " iter |    residual    |     pressure     |    liquid density    |    vapor density     | inner"
    );
    log_iter!(verbosity, "{:-<96}", "");
    log_iter!(
        verbosity,
        " {:4} |                | {:12.8} | {:12.8} | {:12.8} |",
        0,
        Pressure::from_reduced(pressure),
        Density::from_reduced(rho_l),
        Density::from_reduced(rho_v)
    );

    for i in 1..=max_iter {
        let (a_v, p_v, dp_v) = E::p_dpdrho(parameters, temperature, rho_v);
        let (a_l, p_l, dp_l) = E::p_dpdrho(parameters, temperature, rho_l);

        let dv = rho_v.recip() - rho_l.recip();
        let da = a_v / rho_v - a_l / rho_l + temperature * (rho_v / rho_l).ln();
        let mut p = coexistence_pressure(temperature, [rho_v, rho_l], [a_v, a_l]);
        if p < 0.0 {
            // ideal vapor phase, always positive
            p = p_v * ((-da - p_v / rho_v) / temperature).exp();
        }

        // Newton correction that accounts for the ideal gas pressure
        // dependence of the vapor phase
        let mut inner = 0;
        while inner < MAX_ITER_INNER {
            inner += 1;
            let ratio = p / pressure;
            let f = p * dv + da + temperature * (ratio.ln() + 1.0 - ratio);
            p -= f / (dv + temperature * (p.recip() - pressure.recip()));
            if f.abs() < tol * pressure * dv {
                break;
            }
        }
        if !p.is_finite() {
            return Err(EosError::IterationFailed(String::from("pure_t")));
        }

        rho_l += (p - p_l) / dp_l;
        rho_v += (p - p_v) / dp_v;
        if (rho_v / rho_l - 1.0).abs() < TRIVIAL_REL_DEVIATION {
            return Err(EosError::TrivialSolution);
        }
        if rho_v < 0.0 || rho_l < 0.0 {
            return Err(EosError::IterationFailed(String::from("pure_t")));
        }

        let residual = (p - pressure).abs();
        log_iter!(
            verbosity,
            " {:4} | {:14.8e} | {:12.8} | {:12.8} | {:12.8} | {}",
            i,
            residual,
            Pressure::from_reduced(p),
            Density::from_reduced(rho_l),
            Density::from_reduced(rho_v),
            inner
        );
        if residual < tol * pressure {
            log_result!(
                verbosity,
                "PhaseEquilibrium::pure_t: calculation converged in {} step(s)\n",
                i
            );
            return Ok((pressure, [rho_v, rho_l]));
        }
        pressure = p;
    }
    Err(EosError::NotConverged(String::from("pure_t")))
}

/// Liquid at 75 % of the maximum density and an ideal gas at the pressure
/// that equates the chemical potentials.
fn ideal_gas_start<E: ResidualHelmholtzEnergy>(
    parameters: &E::Parameters<f64>,
    max_density: f64,
    temperature: f64,
) -> (f64, [f64; 2]) {
    let rho_l = 0.75 * max_density;
    let a_res = E::residual_helmholtz_energy(parameters, temperature, rho_l);
    let p = temperature * rho_l * (a_res - 1.0).exp();
    (p, [p / temperature, rho_l])
}

/// Both phases at the mean of the spinodal pressures.
fn spinodal_start<E: ResidualHelmholtzEnergy>(
    parameters: &E::Parameters<f64>,
    max_density: f64,
    temperature: f64,
) -> EosResult<(f64, [f64; 2])> {
    let spinodal = |rho| _pressure_spinodal::<E>(parameters, max_density, temperature, rho);
    let (p_liquid_spinodal, _) = spinodal(0.8 * max_density)?;
    let (p_vapor_spinodal, _) = spinodal(0.001 * max_density)?;
    let p = 0.5 * (p_liquid_spinodal.max(0.0) + p_vapor_spinodal);
    let density = |init| _density_iteration::<E>(parameters, max_density, temperature, p, init);
    let rho_v = density(DensityInitialization::Vapor)?;
    let rho_l = density(DensityInitialization::Liquid)?;
    Ok((p, [rho_v, rho_l]))
}

impl<'a, E: ResidualHelmholtzEnergy> PhaseEquilibrium<'a, E> {
    /// Calculate a phase equilibrium for a pure component
    /// and given pressure.
    ///
    /// The temperature is found with a Newton iteration on the logarithm of
    /// the vapor pressure, the derivative of which is obtained from a dual
    /// number evaluation of [PhaseEquilibrium::pure_t]. Without an initial
    /// temperature, the iteration starts from a corresponding states estimate
    /// based on the critical point.
    pub fn pure_p(
        eos: &'a HelmholtzEnergyWrapper<E, f64>,
        pressure: Pressure,
        initial_temperature: Option<Temperature>,
        options: SolverOptions,
    ) -> EosResult<Self> {
        let (max_iter, tol, verbosity) = options.unwrap_or(MAX_ITER_PURE, TOL_PURE_P);
        let p = pressure.into_reduced();
        if !p.is_finite() || p <= 0.0 {
            return Err(EosError::InvalidState(
                String::from("pure_p"),
                String::from("pressure"),
                p,
            ));
        }

        let mut t = match initial_temperature {
            Some(t) => t.into_reduced(),
            None => {
                let cp = State::critical_point(eos, None, SolverOptions::default())?;
                let p_c = cp.pressure(Contributions::Total).into_reduced();
                if p >= p_c {
                    return Err(EosError::SuperCritical);
                }
                cp.reduced_temperature / (1.0 - (p / p_c).ln() / 5.373)
            }
        };

        let eos_dual = eos.derivatives(E::lift_parameters(&eos.parameters, Dual64::from_re));
        let vle_options = SolverOptions::default();
        let mut vle: Option<PhaseEquilibrium<'_, E, Dual64>> = None;

        log_iter!(
            verbosity,
            " iter |    residual    |   temperature   |    liquid density    |    vapor density     "
        );
        log_iter!(verbosity, "{:-<89}", "");
        log_iter!(verbosity, " {:4} |                | {:13.8} |", 0, Temperature::from_reduced(t));

        for i in 1..=max_iter {
            let temperature = Temperature::from_reduced(Dual64::new(t, 1.0));
            let vle_new = PhaseEquilibrium::pure_t(&eos_dual, temperature, vle.as_ref(), vle_options)?;

            // Newton step for ln(p_sat) - ln(p) = 0
            let p_sat = vle_new.vapor().pressure(Contributions::Total).into_reduced();
            let res = (p_sat.re / p).ln();
            let mut delta_t = res * p_sat.re / p_sat.eps;
            if delta_t.abs() > 0.1 * t {
                delta_t = 0.1 * t * delta_t.signum();
            }
            t -= delta_t;

            log_iter!(
                verbosity,
                " {:4} | {:14.8e} | {:13.8} | {:12.8} | {:12.8}",
                i,
                res.abs(),
                Temperature::from_reduced(t),
                Density::from_reduced(vle_new.liquid().reduced_density.re),
                Density::from_reduced(vle_new.vapor().reduced_density.re)
            );

            if !t.is_finite() || t <= 0.0 {
                return Err(EosError::IterationFailed("pure_p".to_owned()));
            }
            if delta_t.abs() < t * tol {
                log_result!(
                    verbosity,
                    "PhaseEquilibrium::pure_p: calculation converged in {} step(s)\n",
                    i
                );
                let init = PhaseEquilibrium::pure_t(
                    eos,
                    Temperature::from_reduced(t),
                    None,
                    vle_options,
                )?;
                // final density iterations at exactly the specified pressure
                let temperature = Temperature::from_reduced(t);
                let vapor = State::new_tp(
                    eos,
                    temperature,
                    pressure,
                    Some(DensityInitialization::InitialDensity(init.vapor().density)),
                )?;
                let liquid = State::new_tp(
                    eos,
                    temperature,
                    pressure,
                    Some(DensityInitialization::InitialDensity(init.liquid().density)),
                )?;
                let vle = Self::from_states(vapor, liquid);
                if vle.is_trivial_solution() {
                    return Err(EosError::TrivialSolution);
                }
                return Ok(vle);
            }
            vle = Some(vle_new);
        }
        Err(EosError::NotConverged("pure_p".to_owned()))
    }
}
