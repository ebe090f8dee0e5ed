pub mod dispatch;
pub mod health;
pub mod history;
pub mod predict;
pub mod shared;
pub mod shell;
