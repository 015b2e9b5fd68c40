pub mod assignment_rto;
