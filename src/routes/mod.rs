pub mod audit;
pub mod health;
pub mod logs;
pub mod settings;
