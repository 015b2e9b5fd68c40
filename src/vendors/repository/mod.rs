pub mod vendor_repository;
