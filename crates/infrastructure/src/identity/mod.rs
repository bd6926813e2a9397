//! Identity provider adapters.

mod logto;

pub use logto::LogtoProvider;
