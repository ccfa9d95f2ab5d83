// Engine modules: physics and the fixed-step driver

pub mod game_loop;
pub mod physics;
