pub mod password;
pub mod registration;
