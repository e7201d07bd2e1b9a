mod resolver;
mod services;

pub use resolver::ResolverServices;
pub use services::{build_detector, AppServices};
