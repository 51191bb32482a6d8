use crate::equation_of_state::{HelmholtzEnergyWrapper, ResidualHelmholtzEnergy};
use crate::errors::{EosError, EosResult};
use crate::state::DensityInitialization::{self, InitialDensity, Liquid, Vapor};
use crate::ReferenceSystem;
use num_dual::DualNum;
use quantity::{Density, Pressure, Temperature};

/// Calculate the density of a pure substance at given temperature and pressure.
///
/// Without an initialization, the density of the stable phase is returned.
/// The iteration is performed in `f64`, derivatives of the temperature, the
/// pressure or the model parameters are obtained by implicit differentiation.
pub fn density_iteration<E: ResidualHelmholtzEnergy, D: DualNum<f64> + Copy>(
    eos: &HelmholtzEnergyWrapper<E, D>,
    temperature: Temperature<D>,
    pressure: Pressure<D>,
    initial_density: Option<DensityInitialization>,
) -> EosResult<Density<D>> {
    let t = temperature.into_reduced();
    let p = pressure.into_reduced();
    let parameters = eos.re();
    let max_density = eos.eos.compute_max_density();
    let density = match initial_density {
        Some(init) => _density_iteration::<E>(
            &parameters,
            max_density,
            t.re(),
            p.re(),
            init.into_reduced(),
        ),
        None => _density_iteration_stable::<E>(&parameters, max_density, t.re(), p.re()),
    }?;

    // Implicit differentiation
    let mut density = D::from(density);
    for _ in 0..D::NDERIV {
        let (_, p_i, dp_drho) = E::p_dpdrho(&eos.parameters, t, density);
        density -= (p_i - p) / dp_drho;
    }
    Ok(Density::from_reduced(density))
}

fn _density_iteration_stable<E: ResidualHelmholtzEnergy>(
    parameters: &E::Parameters<f64>,
    max_density: f64,
    temperature: f64,
    pressure: f64,
) -> EosResult<f64> {
    // calculate stable phase
    let liquid = _density_iteration::<E>(parameters, max_density, temperature, pressure, Liquid);

    if pressure < max_density * temperature {
        let vapor = _density_iteration::<E>(parameters, max_density, temperature, pressure, Vapor);
        match (&liquid, &vapor) {
            (Ok(_), Err(_)) => liquid,
            (Err(_), Ok(_)) => vapor,
            (Ok(l), Ok(v)) => {
                if _chemical_potential::<E>(parameters, temperature, *l)
                    > _chemical_potential::<E>(parameters, temperature, *v)
                {
                    vapor
                } else {
                    liquid
                }
            }
            _ => Err(EosError::UndeterminedState(String::from(
                "Density iteration did not find a solution.",
            ))),
        }
    } else {
        liquid
    }
}

fn _chemical_potential<E: ResidualHelmholtzEnergy>(
    parameters: &E::Parameters<f64>,
    temperature: f64,
    density: f64,
) -> f64 {
    E::residual_chemical_potential(parameters, temperature, density) + temperature * density.ln()
}

pub(crate) fn _density_iteration<E: ResidualHelmholtzEnergy>(
    parameters: &E::Parameters<f64>,
    max_density: f64,
    temperature: f64,
    pressure: f64,
    initial_density: DensityInitialization<f64>,
) -> EosResult<f64> {
    const MAX_ITER: usize = 50;
    const ABS_TOL: f64 = 1e-12;
    const REL_TOL: f64 = 1e-14;

    let rho0 = match initial_density {
        Vapor => pressure / temperature,
        Liquid => max_density,
        InitialDensity(d) => d,
    };
    if rho0 <= 0.0 {
        return Err(EosError::InvalidState(
            String::from("density iteration"),
            String::from("density"),
            rho0,
        ));
    }

    let mut rho = rho0;
    for k in 0..MAX_ITER {
        let (_, mut p, mut dp_drho) = E::p_dpdrho(parameters, temperature, rho);

        // a start in the unstable region is moved once towards the expected phase
        if k == 0 && dp_drho < 0.0 {
            rho = if rho0 <= 0.15 * max_density {
                0.05 * rho0
            } else {
                (1.1 * rho0).min(max_density)
            };
            (_, p, dp_drho) = E::p_dpdrho(parameters, temperature, rho);
        }

        let residual = p - pressure;
        if dp_drho < 0.0 {
            rho = restart_from_spinodal::<E>(
                parameters,
                max_density,
                temperature,
                pressure,
                rho0,
                rho,
                residual,
            )?;
            continue;
        }

        let max_step = 0.075 * max_density;
        let step = (-residual / dp_drho).clamp(-max_step, max_step);
        rho += step.max(-0.95 * rho);
        if residual.abs() < ABS_TOL.max(rho * REL_TOL) {
            return if rho.is_finite() {
                Ok(rho)
            } else {
                Err(EosError::IterationFailed(String::from("density_iteration")))
            };
        }
    }
    Err(EosError::NotConverged(String::from("density_iteration")))
}

/// New starting density after the Newton iteration entered the unstable
/// region. The density is moved beyond the spinodal of the phase that is
/// consistent with the sign of the residual and the curvature of the
/// isotherm.
fn restart_from_spinodal<E: ResidualHelmholtzEnergy>(
    parameters: &E::Parameters<f64>,
    max_density: f64,
    temperature: f64,
    pressure: f64,
    rho0: f64,
    rho: f64,
    residual: f64,
) -> EosResult<f64> {
    let spinodal = |rho| _pressure_spinodal::<E>(parameters, max_density, temperature, rho);
    let (_, _, d2p_drho2) = E::p_dpdrho_d2pdrho2(parameters, temperature, rho);
    let above = residual > 0.0;
    let convex = d2p_drho2 > 0.0;

    if rho > 0.85 * max_density {
        let (p_sp, rho_sp) = spinodal(rho0)?;
        let above_sp = p_sp > pressure;
        return if rho_sp > 0.85 * max_density {
            if above_sp {
                Ok(0.98 * rho_sp)
            } else {
                Err(EosError::IterationFailed(String::from("density_iteration")))
            }
        } else if above_sp {
            Ok(0.001 * max_density)
        } else {
            Ok((1.1 * rho_sp).min(max_density))
        };
    }

    let rho_new = match (above, convex) {
        (true, true) => {
            let (p_sp, rho_sp) = spinodal(rho0)?;
            if p_sp > pressure {
                0.001 * max_density
            } else {
                (1.1 * rho_sp).min(max_density)
            }
        }
        (false, false) => {
            let (p_sp, rho_sp) = spinodal(rho0)?;
            if p_sp < pressure {
                0.8 * max_density
            } else {
                0.8 * rho_sp
            }
        }
        _ => {
            let (_, rho_l) = spinodal(0.8 * max_density)?;
            let (p_v, rho_v) = spinodal(0.001 * max_density)?;
            let closer_to_vapor = (rho0 - rho_v).abs() < (rho0 - rho_l).abs();
            let vapor = if convex {
                p_v > pressure && closer_to_vapor
            } else {
                !(p_v < pressure && !closer_to_vapor)
            };
            if vapor {
                0.8 * rho_v
            } else {
                (1.1 * rho_l).min(max_density)
            }
        }
    };
    Ok(rho_new)
}

/// Find the extremum of the pressure (spinodal) closest to `rho_init`.
pub(crate) fn _pressure_spinodal<E: ResidualHelmholtzEnergy>(
    parameters: &E::Parameters<f64>,
    max_density: f64,
    temperature: f64,
    rho_init: f64,
) -> EosResult<(f64, f64)> {
    const MAX_ITER: usize = 30;
    const TOL: f64 = 1e-8;

    if rho_init <= 0.0 {
        return Err(EosError::InvalidState(
            String::from("pressure spinodal"),
            String::from("density"),
            rho_init,
        ));
    }

    let mut rho = rho_init;
    let max_step = 0.05 * max_density;
    for _ in 0..MAX_ITER {
        let (p, dp_drho, d2p_drho2) = E::p_dpdrho_d2pdrho2(parameters, temperature, rho);
        let step = (-dp_drho / d2p_drho2).clamp(-max_step, max_step);
        rho += step.clamp(-0.95 * rho, max_density - rho);
        if dp_drho.abs() < TOL {
            return Ok((p, rho));
        }
    }
    Err(EosError::NotConverged(String::from("pressure_spinodal")))
}
