mod library;
mod native;
mod symbol;

pub use library::{DynamicLibrary, Module};
pub use native::{NativeType, NativeValue};
pub use symbol::{DynamicSymbol, ForeignFunction};
