pub mod constants;
pub mod grid;
pub mod time;
