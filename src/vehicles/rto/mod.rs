pub mod get_vehicle_rto;
