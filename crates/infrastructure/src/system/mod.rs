pub mod clock;
pub mod probe;

pub use clock::SystemClock;
pub use probe::HttpsConnectivityProbe;
