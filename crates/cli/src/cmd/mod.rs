pub mod custody;
pub mod init;
pub mod spec;
