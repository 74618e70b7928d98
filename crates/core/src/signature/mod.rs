//! Building root signatures from shader resources and committing resource caches against them.

mod builder;
mod commit;
mod desc;
mod error;
mod policy;
mod root_signature;
mod static_sampler;

pub use builder::*;
pub use desc::*;
pub use error::*;
pub use policy::*;
pub use root_signature::*;
pub use static_sampler::*;
