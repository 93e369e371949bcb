mod client;
mod command;

pub use client::{DroneClient, LinkError, LinkEvent};
pub use command::{FlightCommand, LedAnimation};

#[cfg(test)]
mod tests;
