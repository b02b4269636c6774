/// Game state and the rules that advance it, one tick at a time.

pub mod chart;
pub mod event;
pub mod layout;
pub mod session;
pub mod step;
