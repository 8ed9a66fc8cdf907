//! Physical constants shared by the scene and the integrator. All values are SI.

/// Newtonian gravitational constant in m³·kg⁻¹·s⁻².
pub const G: f64 = 6.67430e-11;

/// Speed of light in vacuum in m/s.
pub const C: f64 = 299_792_458.0;

/// Mass of the default central body in kg.
pub const BLACK_HOLE_MASS: f64 = 8.54e36;

/// One solar mass in kg, used for the orbiting test bodies.
pub const SOLAR_MASS: f64 = 1.98892e30;

/// Radius of the event horizon of a non-rotating body of `mass` kilograms.
pub fn schwarzschild_radius(mass: f64) -> f64 {
    2.0 * G * mass / (C * C)
}
