pub mod gateway;
pub mod interface;
pub mod mac;
pub mod range;
