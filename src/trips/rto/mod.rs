pub mod get_trip_rto;
