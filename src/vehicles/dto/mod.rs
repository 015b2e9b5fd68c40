pub mod vehicle_dto;
pub mod vehicle_list_query_dto;
