mod sea_generator;

pub use sea_generator::{SeaFunction, SeaGenerator};
