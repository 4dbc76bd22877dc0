pub mod ident;
pub mod model;
pub mod payment;
pub mod pii;
pub mod principal;
