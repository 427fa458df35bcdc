use oauth2::{ClientId, ClientSecret};

/// Application registration in a tenant.
#[derive(Clone, Debug)]
pub struct Credentials {
    client_id: ClientId,

    client_secret: ClientSecret,

    tenant_id: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Credentials {
        Credentials {
            client_id: ClientId::new(client_id.into()),
            client_secret: ClientSecret::new(client_secret.into()),
            tenant_id: tenant_id.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        self.client_id.as_str()
    }

    pub fn client_secret(&self) -> &str {
        self.client_secret.secret()
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}
