pub mod trip_dto;
pub mod trip_list_query_dto;
