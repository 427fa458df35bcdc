pub const API_BASE: &str = "https://api.businesscentral.dynamics.com";
pub const LOGIN_BASE: &str = "https://login.microsoftonline.com";

/// Hosts serving the Business Central API and the Microsoft identity platform.
///
/// Every URL is derived from these and a tenant id. Override them for
/// sovereign clouds or to point the client at a local mock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    api_base: String,

    login_base: String,
}

impl Endpoints {
    pub fn new(api_base: impl Into<String>, login_base: impl Into<String>) -> Endpoints {
        Endpoints {
            api_base: api_base.into().trim_end_matches('/').to_owned(),
            login_base: login_base.into().trim_end_matches('/').to_owned(),
        }
    }

    /// `https://api.businesscentral.dynamics.com/v2.0/{tenant}/`
    pub fn base_href(&self, tenant_id: &str) -> String {
        format!("{}/v2.0/{}/", self.api_base, tenant_id)
    }

    pub fn url(&self, tenant_id: &str, endpoint: &str) -> String {
        format!(
            "{}{}",
            self.base_href(tenant_id),
            endpoint.trim_start_matches('/')
        )
    }

    pub fn token_url(&self, tenant_id: &str) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.login_base, tenant_id)
    }

    pub fn authorize_url(&self, tenant_id: &str) -> String {
        format!("{}/{}/oauth2/v2.0/authorize", self.login_base, tenant_id)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints::new(API_BASE, LOGIN_BASE)
    }
}
