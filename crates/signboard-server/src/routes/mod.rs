pub mod display;
pub mod sign;
