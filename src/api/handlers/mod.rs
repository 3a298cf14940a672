pub mod emergency;
pub mod health;
pub mod metrics;
pub mod upload;
