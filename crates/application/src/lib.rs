//! ipmon application layer: ports, the resolver pipeline, the connection
//! registry and the message router.
pub mod ports;
pub mod services;
pub mod use_cases;
