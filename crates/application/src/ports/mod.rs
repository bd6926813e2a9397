//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external
//! systems. Each port is a trait that can be implemented by adapters in
//! the infrastructure layer, or by fakes in tests.

mod cipher;
mod http;
mod identity;
mod key_value;
mod navigator;

pub use cipher::ConversationCipher;
pub use http::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError, DEFAULT_TIMEOUT,
};
pub use identity::IdentityProvider;
pub use key_value::KeyValueStore;
pub use navigator::Navigator;
