mod keys;
mod orientation;

pub use keys::{KeyAction, map_key, run_key_input};
pub use orientation::OrientationEndpoint;

#[cfg(test)]
mod tests;
