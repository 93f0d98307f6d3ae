pub mod clickhouse;
pub mod mysql;
pub mod rest;
