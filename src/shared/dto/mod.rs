pub mod pagination_dto;
pub mod uuid_path_dto;
