pub mod duplicate;
pub mod health;
