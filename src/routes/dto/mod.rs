pub mod route_dto;
