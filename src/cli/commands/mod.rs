pub mod analyze;
pub mod auth;
pub mod define;
pub mod doctor;
pub mod history;
pub mod init;
pub mod paste;
pub mod words;
