pub mod components;
pub mod estimator;
