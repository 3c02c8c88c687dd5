pub mod envelope;
pub mod http;
pub mod identity;
pub mod mock;

pub use http::HttpResourceClient;
pub use identity::MockIdentityProvider;
pub use mock::MockResourceClient;
