//! Adapter implementations for application ports.

mod navigator;
mod reqwest_transport;
mod system_clock;

pub use navigator::LoggingNavigator;
pub use reqwest_transport::ReqwestTransport;
pub use system_clock::SystemClock;
