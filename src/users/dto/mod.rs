pub mod create_user_dto;
pub mod update_user_dto;
pub mod user_list_query_dto;
