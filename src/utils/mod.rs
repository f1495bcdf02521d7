pub mod mysql_password_encrypted;
pub mod time;
