//! OAuth 2.0 protocol flows.
//!
//! - [`authorize`] - authorization-endpoint wire types and redirect building
//! - [`token`] - token-endpoint wire types and form parsing
//! - [`provider`] - the authorization state machine
//! - [`resource`] - bearer-token validation for resource requests
//! - [`response`] - transport-neutral response construction

pub mod authorize;
pub mod provider;
pub mod resource;
pub mod response;
pub mod token;

pub use authorize::{AuthorizeRedirect, AuthorizeRequest};
pub use provider::AuthorizationProvider;
pub use resource::{ResourceAuthorization, ResourceProvider};
pub use response::ProviderResponse;
pub use token::{TokenGrant, TokenRequest};
