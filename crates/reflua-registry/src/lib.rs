//! Type registry for the reflua bridge.
//!
//! Native types are described once, through [`TypeRegistry::register_class`],
//! and the bridge enumerates the result at bind time.

mod class_builder;
mod registry;

pub use class_builder::ClassBuilder;
pub use registry::TypeRegistry;
