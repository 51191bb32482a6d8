mod critical_properties;
mod properties;
mod vle;
