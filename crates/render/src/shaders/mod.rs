//! Concrete shader programs. Each wraps a [`ProgramCore`](crate::ProgramCore)
//! built from a fixed [`ProgramLayout`](crate::ProgramLayout).

mod bright_filter;
mod shadow;
mod water;

pub use bright_filter::BrightFilterShader;
pub use shadow::ShadowShader;
pub use water::WaterShader;
