// Component A: sensor acquisition and local actuation
// Samples the sensors on a fixed period, drives display/buzzer/lights,
// and publishes each reading into the shared snapshot for the server.

pub mod sensor;
pub mod actuation;
pub mod acquisition;
