pub mod document;
pub mod extract;
pub mod generator;
pub mod postprocess;
pub mod prompts;
pub mod repair;
pub mod retry;
pub mod schema;
