pub mod cors;
pub mod password;

pub use cors::{create_cors_layer, origin_gate, OriginValidator};
pub use password::{hash_password, verify_password};
