pub mod init;
pub mod ordered;
pub mod plans;
pub mod register;
pub mod registrations;
pub mod session;
pub mod slots;
pub mod team;
pub mod watch;
