//! Built-in screen tasks.
//!
//! These follow the same rules as out-of-tree tasks: no direct screen or
//! clock access, just `draw_frame` against the canvas with the delta the
//! scheduler hands over.

mod fade;
mod fault;
mod mandelbrot;
mod percolate;
mod pong;
mod rainbow;

pub use fade::ColorFade;
pub use fault::FaultReport;
pub use mandelbrot::Mandelbrot;
pub use percolate::Percolate;
pub use pong::Pong;
pub use rainbow::RainbowWave;

use crate::error::SignwheelResult;
use crate::registry::TaskRegistry;

/// Register every built-in rotation task.
pub fn install_builtin(registry: &mut TaskRegistry) -> SignwheelResult<()> {
    registry.register(Box::new(ColorFade::new()))?;
    registry.register(Box::new(RainbowWave::new()))?;
    registry.register(Box::new(Pong::new()))?;
    registry.register(Box::new(Mandelbrot::new()))?;
    registry.register(Box::new(Percolate::new()))?;
    Ok(())
}
