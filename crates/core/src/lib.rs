#![forbid(unsafe_code)]

pub mod model;
pub mod time;
pub mod upgrade;

pub use time::Clock;
