//! Command implementations for the Lese CLI.

mod add_book;
mod chat;
mod config;
mod doctor;
mod init;
mod search;
mod signup;

pub use add_book::run_add_book;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use init::run_init;
pub use search::run_search;
pub use signup::run_signup;
