pub mod customer_repo;
pub mod token_pair_repo;
pub mod user_repo;
