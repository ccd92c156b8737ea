mod completion_provider;

pub use completion_provider::*;
