pub mod access_token_claims;
