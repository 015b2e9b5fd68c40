pub mod vendor_dto;
