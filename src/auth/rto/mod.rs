pub mod access_token_rto;
