// Parallax: turns a described workplace situation into strategy options,
// then drafts a message for the option the user picks.

pub mod advisor;
pub mod handlers;
pub mod models;
pub mod prompts;
