// Tact: tone analysis of a single message.
// Validation, prompt composition and post-processing live here; every model
// call goes through dispatch::Dispatcher.

pub mod analyzer;
pub mod handlers;
pub mod models;
pub mod prompts;
