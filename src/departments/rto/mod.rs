pub mod get_department_rto;
