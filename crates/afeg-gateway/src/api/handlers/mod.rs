//! REST handlers.

mod gateway;
mod health;
mod ledger;
mod surge;
mod treasury;

pub use gateway::submit_query;
pub use health::{gateway_status, health_check};
pub use ledger::{clear_ledgers, export_ledgers, query_ledger};
pub use surge::run_surge;
pub use treasury::treasury_view;
