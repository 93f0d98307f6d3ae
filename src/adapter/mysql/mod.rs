//! Relational store for organizations, teams, users and their dashboards.

mod store;

pub use store::{MySqlSettings, MySqlStore};
