/// Terminal, audio and controller IO.

pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod sound;
