//! Output side of the driver.
pub mod stdout;
