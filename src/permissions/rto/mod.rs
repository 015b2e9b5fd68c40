pub mod get_permission_rto;
