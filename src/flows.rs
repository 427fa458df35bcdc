pub mod authorization_code_flow;
pub mod client_credentials_flow;
pub mod token_flow;

pub use authorization_code_flow::AuthorizationCode;
pub use client_credentials_flow::ClientCredentials;
pub use token_flow::TokenFlow;
