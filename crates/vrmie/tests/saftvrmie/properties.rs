use approx::assert_relative_eq;
use num_dual::Dual64;
use quantity::*;
use vrmie::saftvrmie::{test_utils, SaftVRMie};
use vrmie_core::{
    Contributions, DensityInitialization, EosResult, HelmholtzEnergyWrapper, ParametersAD,
    ReferenceSystem, ResidualHelmholtzEnergy, State,
};

fn eos(name: &str) -> HelmholtzEnergyWrapper<SaftVRMie, f64> {
    SaftVRMie::new(test_utils::test_parameters().remove(name).unwrap()).wrap()
}

#[test]
fn ideal_gas_limit() -> EosResult<()> {
    for name in ["propane", "methanol"] {
        let eos = eos(name);
        let t = 400.0 * KELVIN;
        let s = State::new(&eos, t, Density::from_reduced(1e-12))?;
        assert_relative_eq!(s.compressibility(Contributions::Total), 1.0, epsilon = 1e-8);
        assert!(s.residual_molar_helmholtz_energy().to_reduced().abs() < 1e-6);
        let p_ig = s.pressure(Contributions::IdealGas);
        assert_relative_eq!(p_ig, s.density * RGAS * t, max_relative = 1e-10);
    }
    Ok(())
}

#[test]
fn pressure_from_helmholtz_energy_derivative() -> EosResult<()> {
    let eos = eos("methanol");
    let (t, rho) = (350.0, 0.02);
    let s = State::new(
        &eos,
        Temperature::from_reduced(t),
        Density::from_reduced(rho),
    )?;
    let [_, da, _] = s.residual_helmholtz_energy_derivatives();
    let p = t * rho * (1.0 + rho * da);
    assert_relative_eq!(
        s.pressure(Contributions::Total).to_reduced(),
        p,
        max_relative = 1e-12
    );
    Ok(())
}

#[test]
fn pressure_derivatives() -> EosResult<()> {
    for (name, rho) in [("hexane", 0.004), ("water", 0.03)] {
        let eos = eos(name);
        let t = Temperature::from_reduced(380.0);
        let h = 1e-5 * rho;
        let s = State::new(&eos, t, Density::from_reduced(rho))?;
        let sp = State::new(&eos, t, Density::from_reduced(rho + h))?;
        let sm = State::new(&eos, t, Density::from_reduced(rho - h))?;

        let p = |s: &State<SaftVRMie>| s.pressure(Contributions::Total).to_reduced();
        let dp = |s: &State<SaftVRMie>| s.dp_drho().to_reduced();
        assert_relative_eq!(
            s.dp_drho().to_reduced(),
            (p(&sp) - p(&sm)) / (2.0 * h),
            max_relative = 1e-6
        );
        assert_relative_eq!(
            s.d2p_drho2(),
            (dp(&sp) - dp(&sm)) / (2.0 * h),
            max_relative = 1e-5
        );
    }
    Ok(())
}

#[test]
fn heat_capacities() -> EosResult<()> {
    let eos = eos("propane");
    let s = State::new_tp(
        &eos,
        250.0 * KELVIN,
        10.0 * BAR,
        Some(DensityInitialization::Liquid),
    )?;
    let c_v = s.molar_isochoric_heat_capacity(Contributions::Total);
    let c_p = s.molar_isobaric_heat_capacity(Contributions::Total);
    assert!(c_v.to_reduced() > 0.0);
    assert!(c_p > c_v);

    let c_p_ig = s.molar_isobaric_heat_capacity(Contributions::IdealGas);
    let c_v_ig = s.molar_isochoric_heat_capacity(Contributions::IdealGas);
    assert_relative_eq!(c_p_ig - c_v_ig, RGAS, max_relative = 1e-10);
    assert_relative_eq!(c_v_ig, 1.5 * RGAS, max_relative = 1e-10);
    Ok(())
}

#[test]
fn gibbs_energy() -> EosResult<()> {
    let eos = eos("methanol");
    let t = 300.0 * KELVIN;
    let s = State::new_tp(&eos, t, 1.0 * BAR, Some(DensityInitialization::Liquid))?;
    let mu = s.chemical_potential(Contributions::Total);
    let h = s.molar_enthalpy(Contributions::Total);
    let ts = t * s.molar_entropy(Contributions::Total);
    assert_relative_eq!(mu, h - ts, max_relative = 1e-10);

    let mu_res = s.residual_chemical_potential();
    assert_relative_eq!(
        mu_res,
        s.chemical_potential(Contributions::Residual),
        max_relative = 1e-12
    );
    Ok(())
}

#[test]
fn contributions_sum_to_helmholtz_energy() -> EosResult<()> {
    let eos = eos("water");
    let t = Temperature::from_reduced(350.0);
    let s = State::new(&eos, t, Density::from_reduced(0.03))?;
    let contributions = s.helmholtz_energy_contributions();
    let names: Vec<_> = contributions.iter().map(|&(name, _)| name).collect();
    assert_eq!(
        names,
        [
            "Ideal gas (de Broglie)",
            "Hard Sphere",
            "Dispersion",
            "Chain",
            "Association"
        ]
    );
    let a: f64 = contributions.iter().map(|&(_, a)| a).sum();
    assert_relative_eq!(
        MolarEnergy::from_reduced(a * t.to_reduced()),
        s.molar_helmholtz_energy(Contributions::Total),
        max_relative = 1e-12
    );
    Ok(())
}

#[test]
fn density_iteration() -> EosResult<()> {
    let eos = eos("ethane");
    let t = 250.0 * KELVIN;
    let p = 10.0 * BAR;
    let liquid = State::new_tp(&eos, t, p, Some(DensityInitialization::Liquid))?;
    let vapor = State::new_tp(&eos, t, p, Some(DensityInitialization::Vapor))?;
    let stable = State::new_tp(&eos, t, p, None)?;
    assert!(liquid.density > vapor.density);
    for s in [&liquid, &vapor, &stable] {
        assert_relative_eq!(s.pressure(Contributions::Total), p, max_relative = 1e-8);
        assert!(s.dp_drho().to_reduced() > 0.0);
    }

    // below the vapor pressure (about 13 bar) the vapor is stable
    assert_relative_eq!(stable.density, vapor.density, max_relative = 1e-10);
    assert!(
        vapor.chemical_potential(Contributions::Total)
            < liquid.chemical_potential(Contributions::Total)
    );

    // above the vapor pressure the liquid is stable
    let p = 20.0 * BAR;
    let liquid = State::new_tp(&eos, t, p, Some(DensityInitialization::Liquid))?;
    let stable = State::new_tp(&eos, t, p, None)?;
    assert_relative_eq!(stable.density, liquid.density, max_relative = 1e-10);
    Ok(())
}

#[test]
fn pressure_parameter_derivative() -> EosResult<()> {
    let eos = eos("propane");
    let eos_sigma = eos.named_derivative("sigma")?;
    let (t, rho) = (300.0, 0.008);
    let s = State::new(
        &eos_sigma,
        Temperature::from_reduced(Dual64::from_re(t)),
        Density::from_reduced(Dual64::from_re(rho)),
    )?;
    let dp_dsigma = s.pressure(Contributions::Total).into_reduced().eps;

    let h = 1e-6;
    let p = |dsigma: f64| {
        let mut parameters = eos.re();
        parameters.sigma += dsigma;
        SaftVRMie::pressure(&parameters, t, rho)
    };
    assert_relative_eq!(dp_dsigma, (p(h) - p(-h)) / (2.0 * h), max_relative = 1e-6);
    Ok(())
}
