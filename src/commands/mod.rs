pub mod auth;
pub mod repl;
pub mod say;
