pub mod habit_ops;
pub mod naming;
pub mod order;
