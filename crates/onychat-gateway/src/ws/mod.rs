pub mod ingress;
pub mod transport;
