//! SAFT-VR Mie equation of state for pure fluids.
//!
//! The model is built from the generic machinery of [vrmie_core]: all
//! contributions are evaluated with (generalized) dual numbers, so that
//! derivatives with respect to temperature, density and the model
//! parameters are available for every property, critical point and phase
//! equilibrium.
#![warn(clippy::all)]

pub mod association;
pub mod hard_sphere;
pub mod ideal_gas;
pub mod saftvrmie;
