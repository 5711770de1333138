pub mod control;
pub mod dns;
pub mod persistence;
pub mod probe;
