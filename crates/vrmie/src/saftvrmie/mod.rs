//! SAFT-VR Mie equation of state.
//!
//! # Example
//!
//! ```
//! # use vrmie_core::EosError;
//! use vrmie::saftvrmie::{test_utils::test_parameters, SaftVRMie};
//! use vrmie_core::{ParametersAD, State};
//!
//! let propane = test_parameters().remove("propane").unwrap();
//! let eos = SaftVRMie::new(propane).wrap();
//! let cp = State::critical_point(&eos, None, Default::default())?;
//! println!("{cp}");
//! # Ok::<(), EosError>(())
//! ```
mod eos;
mod parameters;

pub use eos::{SaftVRMie, SaftVRMieOptions};
pub use parameters::{SaftVRMieAssociationRecord, SaftVRMiePars, SaftVRMieRecord};

#[doc(hidden)]
pub use parameters::test_utils;
