pub mod coefficients;
pub mod segment;
