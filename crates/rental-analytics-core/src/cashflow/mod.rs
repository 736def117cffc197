pub mod analysis;
pub mod tax;
