pub mod department_repository;
