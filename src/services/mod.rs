pub mod dispatcher;
pub mod email;
pub mod prediction_log;
pub mod sms;

pub use dispatcher::{AlertDispatcher, AlertMessage, AlertTransport, DispatchError};
pub use email::EmailTransport;
pub use prediction_log::PredictionLog;
pub use sms::SmsTransport;
