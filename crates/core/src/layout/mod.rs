//! Shader-facing description of resources, as produced by shader reflection.

mod resource;
mod sampler;
mod shader;
mod shader_stage;
mod variable_type;

pub use resource::*;
pub use sampler::*;
pub use shader::*;
pub use shader_stage::*;
pub use variable_type::*;
