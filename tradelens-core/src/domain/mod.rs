//! Domain types for TradeLens

pub mod ids;
pub mod manual;
pub mod session;
pub mod trade;

pub use ids::ReportFingerprint;
pub use manual::{ManualTradeError, ManualTradeInput, STANDARD_LOT};
pub use session::Session;
pub use trade::{Side, Trade, TradeParts};
