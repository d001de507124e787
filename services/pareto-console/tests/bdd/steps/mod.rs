//! BDD step definitions for the pareto console

pub mod alert_steps;
pub mod crud_steps;
pub mod migration_steps;
pub mod session_steps;
