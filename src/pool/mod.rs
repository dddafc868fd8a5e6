pub mod quote;
pub mod simulator;
pub mod snapshot;
pub mod swap;
pub mod tick_cross;
pub mod tick_index;
