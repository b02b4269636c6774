/// Pure game rules: no IO, no terminal, no clocks.

pub mod boat;
pub mod effects;
pub mod shop;
pub mod tile;
pub mod vitals;
