pub mod derived;
pub mod field;
pub mod legendre;
pub mod secular;
pub mod temporal;
