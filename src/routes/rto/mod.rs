pub mod get_route_rto;
