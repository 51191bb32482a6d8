use approx::assert_relative_eq;
use num_dual::Dual64;
use quantity::*;
use vrmie::saftvrmie::{test_utils, SaftVRMie};
use vrmie_core::{
    Contributions, EosResult, HelmholtzEnergyWrapper, ParametersAD, PhaseDiagram,
    PhaseEquilibrium, ReferenceSystem,
};

fn eos(name: &str) -> HelmholtzEnergyWrapper<SaftVRMie, f64> {
    SaftVRMie::new(test_utils::test_parameters().remove(name).unwrap()).wrap()
}

#[test]
fn vle_pure_temperature() -> EosResult<()> {
    let eos = eos("propane");
    let t = 300.0 * KELVIN;
    let vle = PhaseEquilibrium::pure_t(&eos, t, None, Default::default())?;
    let (vapor, liquid) = (vle.vapor(), vle.liquid());
    assert!(!vle.is_trivial_solution());
    assert!(liquid.density > vapor.density);
    assert_relative_eq!(
        vapor.pressure(Contributions::Total),
        liquid.pressure(Contributions::Total),
        max_relative = 1e-8
    );
    assert_relative_eq!(
        vapor.chemical_potential(Contributions::Total),
        liquid.chemical_potential(Contributions::Total),
        max_relative = 1e-8
    );

    // experimental vapor pressure: 0.9935 MPa
    let p_sat = vapor.pressure(Contributions::Total).convert_into(MEGA * PASCAL);
    assert!(p_sat > 0.9 && p_sat < 1.1, "{p_sat}");
    Ok(())
}

#[test]
fn vle_pure_pressure() -> EosResult<()> {
    let eos = eos("propane");
    let vle_t = PhaseEquilibrium::pure_t(&eos, 280.0 * KELVIN, None, Default::default())?;
    let p = vle_t.vapor().pressure(Contributions::Total);
    let vle_p = PhaseEquilibrium::pure_p(&eos, p, None, Default::default())?;
    assert_relative_eq!(
        vle_p.vapor().temperature,
        280.0 * KELVIN,
        max_relative = 1e-7
    );
    assert_relative_eq!(
        vle_p.liquid().density,
        vle_t.liquid().density,
        max_relative = 1e-7
    );
    assert_relative_eq!(
        vle_p.vapor().density,
        vle_t.vapor().density,
        max_relative = 1e-6
    );
    Ok(())
}

#[test]
fn vle_pure_initial_state() -> EosResult<()> {
    let eos = eos("pentane");
    let vle = PhaseEquilibrium::pure_t(&eos, 350.0 * KELVIN, None, Default::default())?;
    let vle2 = PhaseEquilibrium::pure_t(&eos, 351.0 * KELVIN, Some(&vle), Default::default())?;
    assert!(vle2.vapor().pressure(Contributions::Total) > vle.vapor().pressure(Contributions::Total));
    Ok(())
}

#[test]
fn phase_diagram() -> EosResult<()> {
    let eos = eos("hexane");
    let npoints = 20;
    let diagram = PhaseDiagram::pure(&eos, 300.0 * KELVIN, npoints, None, Default::default())?;
    assert_eq!(diagram.states.len(), npoints);

    let temperature = diagram.temperature();
    let pressure = diagram.pressure();
    for i in 1..npoints {
        assert!(temperature[i] > temperature[i - 1]);
        assert!(pressure[i] > pressure[i - 1]);
    }
    for [rho_v, rho_l] in diagram.densities().into_iter().take(npoints - 1) {
        assert!(rho_l > rho_v);
    }

    // the last point is the critical point
    let cp = diagram.states.last().unwrap();
    assert!(cp.is_trivial_solution());
    let tc = cp.vapor().temperature.to_reduced();
    assert_relative_eq!(tc, 515.29, max_relative = 2e-3);
    Ok(())
}

#[test]
fn clausius_clapeyron() -> EosResult<()> {
    let eos = eos("n-butane");
    let eos_dual = eos.derivatives(eos.parameters.lift(Dual64::from_re));
    let t = Temperature::from_reduced(Dual64::new(320.0, 1.0));
    let vle = PhaseEquilibrium::pure_t(&eos_dual, t, None, Default::default())?;
    let dp_dt = vle.vapor().pressure(Contributions::Total).into_reduced().eps;

    let vle = PhaseEquilibrium::pure_t(&eos, 320.0 * KELVIN, None, Default::default())?;
    let (vapor, liquid) = (vle.vapor(), vle.liquid());
    let ds = vapor.molar_entropy(Contributions::Total).to_reduced()
        - liquid.molar_entropy(Contributions::Total).to_reduced();
    let dv = vapor.density.to_reduced().recip() - liquid.density.to_reduced().recip();
    assert_relative_eq!(dp_dt, ds / dv, max_relative = 1e-6);
    Ok(())
}

#[test]
fn vle_pure_associating() -> EosResult<()> {
    for name in ["methanol", "water"] {
        let eos = eos(name);
        let mut p_sat = 0.0;
        for t in [300.0, 350.0, 400.0] {
            let vle = PhaseEquilibrium::pure_t(&eos, t * KELVIN, None, Default::default())?;
            let (vapor, liquid) = (vle.vapor(), vle.liquid());
            assert!(liquid.density > vapor.density);
            assert_relative_eq!(
                vapor.chemical_potential(Contributions::Total),
                liquid.chemical_potential(Contributions::Total),
                max_relative = 1e-8
            );
            let p = vapor.pressure(Contributions::Total).to_reduced();
            assert!(p > p_sat, "{name}: {t}");
            p_sat = p;
        }
    }
    Ok(())
}

#[test]
fn vle_above_critical_temperature() {
    let eos = eos("methane");
    assert!(PhaseEquilibrium::pure_t(&eos, 250.0 * KELVIN, None, Default::default()).is_err());
}
