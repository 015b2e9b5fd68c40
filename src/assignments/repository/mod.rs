pub mod assignment_repository;
