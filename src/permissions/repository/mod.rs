pub mod permission_repository;
