use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wrapquote_core::{AggregateId, DomainError, DomainResult, Entity, TenantId};

/// Client identifier (tenant-scoped via the owning `tenant_id`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub AggregateId);

impl ClientId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ClientId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Optional ways to reach a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ContactInfo {
    fn validate(&self) -> DomainResult<()> {
        if let Some(email) = self.email.as_deref() {
            let well_formed = email
                .split_once('@')
                .is_some_and(|(user, domain)| !user.is_empty() && !domain.is_empty());
            if !well_formed {
                return Err(DomainError::invalid_input("email", "must look like user@domain"));
            }
        }
        Ok(())
    }

    /// Empty strings mean "not provided".
    fn normalized(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            email: clean(self.email),
            phone: clean(self.phone),
            address: clean(self.address),
        }
    }
}

/// Command: RegisterClient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterClient {
    pub tenant_id: TenantId,
    pub client_id: ClientId,
    pub name: String,
    pub contact: ContactInfo,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateClient. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateClient {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    id: ClientId,
    tenant_id: TenantId,
    name: String,
    contact: ContactInfo,
    registered_at: DateTime<Utc>,
}

impl Client {
    pub fn register(cmd: RegisterClient) -> DomainResult<Self> {
        let name = cmd.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::invalid_input("name", "must not be blank"));
        }
        let contact = cmd.contact.normalized();
        contact.validate()?;

        Ok(Self {
            id: cmd.client_id,
            tenant_id: cmd.tenant_id,
            name,
            contact,
            registered_at: cmd.occurred_at,
        })
    }

    /// Returns the updated client; `self` is untouched on error.
    pub fn updated(&self, cmd: UpdateClient) -> DomainResult<Self> {
        let name = match cmd.name {
            Some(name) if name.trim().is_empty() => {
                return Err(DomainError::invalid_input("name", "must not be blank"));
            }
            Some(name) => name.trim().to_string(),
            None => self.name.clone(),
        };

        let contact = ContactInfo {
            email: cmd.email.or_else(|| self.contact.email.clone()),
            phone: cmd.phone.or_else(|| self.contact.phone.clone()),
            address: cmd.address.or_else(|| self.contact.address.clone()),
        }
        .normalized();
        contact.validate()?;

        Ok(Self {
            name,
            contact,
            ..self.clone()
        })
    }

    pub fn id_typed(&self) -> ClientId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
