pub mod get_user_rto;
