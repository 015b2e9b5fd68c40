pub mod created_rto;
pub mod list_rto;
