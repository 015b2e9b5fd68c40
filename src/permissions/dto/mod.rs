pub mod create_permission_dto;
pub mod role_permission_path_dto;
