pub mod authorization;
pub mod config;
pub mod database;
pub mod dto;
pub mod http_error;
pub mod middleware;
pub mod repository;
pub mod responses;
pub mod role;
pub mod rto;
