pub mod phase;
pub mod run_ctx;

pub use phase::{waiting_message, Phase};
pub use run_ctx::RunContext;
