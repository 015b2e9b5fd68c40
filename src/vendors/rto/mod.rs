pub mod get_vendor_rto;
