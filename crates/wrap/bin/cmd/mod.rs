pub mod connect;
pub mod deposit;
