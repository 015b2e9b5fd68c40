pub mod trip_repository;
