use approx::assert_relative_eq;
use quantity::*;
use std::collections::HashMap;
use vrmie::saftvrmie::{test_utils, SaftVRMie};
use vrmie_core::{Contributions, EosResult, ParametersAD, ReferenceSystem, SolverOptions, State};

/// Critical data reported in Lafitte et al.
pub fn critical_data() -> HashMap<&'static str, (Temperature, Pressure, MassDensity)> {
    let mut data = HashMap::new();
    let kg_m3 = KILOGRAM / METER.powi::<typenum::P3>();
    let mpa = MEGA * PASCAL;
    let k = KELVIN;

    _ = data.insert("methane", (195.30 * k, 5.15 * mpa, 154.45 * kg_m3));
    _ = data.insert("ethane", (311.38 * k, 5.49 * mpa, 205.84 * kg_m3));
    _ = data.insert("propane", (376.20 * k, 4.77 * mpa, 219.98 * kg_m3));
    _ = data.insert("n-butane", (432.68 * k, 4.27 * mpa, 228.04 * kg_m3));
    _ = data.insert("pentane", (476.44 * k, 3.81 * mpa, 238.14 * kg_m3));
    _ = data.insert("hexane", (515.29 * k, 3.44 * mpa, 241.16 * kg_m3));
    _ = data.insert("heptane", (547.33 * k, 3.06 * mpa, 233.76 * kg_m3));
    _ = data.insert("octane", (576.72 * k, 2.77 * mpa, 227.83 * kg_m3));
    _ = data.insert("decane", (626.37 * k, 2.31 * mpa, 219.85 * kg_m3));
    _ = data.insert("carbon dioxide", (307.00 * k, 7.86 * mpa, 472.15 * kg_m3));
    _ = data.insert("benzene", (568.33 * k, 5.51 * mpa, 307.69 * kg_m3));
    _ = data.insert("toluene", (600.25 * k, 4.73 * mpa, 301.21 * kg_m3));
    data
}

#[test]
fn critical_properties_pure() {
    let t0 = Some(500.0 * KELVIN);
    critical_data().iter().for_each(|(name, data)| {
        dbg!(name);
        let mut parameters = test_utils::test_parameters();
        let option = SolverOptions::default();
        let p = parameters.remove(name).unwrap();
        let eos = SaftVRMie::new(p).wrap();
        let cp = State::critical_point(&eos, t0, option).unwrap();
        assert_relative_eq!(cp.temperature, data.0, max_relative = 2e-3);
        assert_relative_eq!(
            cp.pressure(Contributions::Total),
            data.1,
            max_relative = 5e-3
        );
        assert_relative_eq!(cp.mass_density(), data.2, max_relative = 1e-2);
    })
}

#[test]
fn critical_point_without_initial_temperature() -> EosResult<()> {
    for name in ["methane", "propane", "decane", "carbon dioxide"] {
        let eos = SaftVRMie::new(test_utils::test_parameters().remove(name).unwrap()).wrap();
        let cp = State::critical_point(&eos, None, Default::default())?;
        let cp_t0 = State::critical_point(&eos, Some(500.0 * KELVIN), Default::default())?;
        assert_relative_eq!(cp.temperature, cp_t0.temperature, max_relative = 1e-8);
        assert_relative_eq!(cp.density, cp_t0.density, max_relative = 1e-6);
    }
    Ok(())
}

#[test]
fn critical_point_associating() -> EosResult<()> {
    for name in ["methanol", "water"] {
        let eos = SaftVRMie::new(test_utils::test_parameters().remove(name).unwrap()).wrap();
        let cp = State::critical_point(&eos, None, Default::default())?;
        let tc = cp.temperature.to_reduced();
        assert!(tc > 450.0 && tc < 700.0, "{name}: {tc}");
        assert!(cp.dp_drho().to_reduced().abs() < 1e-6 * cp.temperature.to_reduced());
    }
    Ok(())
}

#[test]
fn critical_temperature_derivative() -> EosResult<()> {
    let record = test_utils::test_parameters().remove("propane").unwrap();
    let eos = SaftVRMie::new(record.clone()).wrap();
    let eos_dual = eos.named_derivative("epsilon_k")?;
    let t0 = Some(400.0 * KELVIN);
    let cp = State::critical_point(&eos_dual, t0, Default::default())?;
    let tc = cp.temperature.into_reduced();

    let h = 1e-3;
    let tc_h = |eps: f64| -> EosResult<f64> {
        let mut record = record.clone();
        record.model_record.epsilon_k = eps;
        let eos = SaftVRMie::new(record).wrap();
        Ok(State::critical_point(&eos, t0, Default::default())?
            .temperature
            .to_reduced())
    };
    let eps = eos.parameters.epsilon_k;
    let dtc = (tc_h(eps + h)? - tc_h(eps - h)?) / (2.0 * h);
    assert_relative_eq!(tc.re, 376.2, max_relative = 2e-3);
    assert_relative_eq!(tc.eps, dtc, max_relative = 1e-4);
    Ok(())
}
