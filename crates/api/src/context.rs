use shopfront_auth::{JwtClaims, PrincipalId};

/// Authenticated identity of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    email: Option<String>,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, email: Option<String>) -> Self {
        Self { principal_id, email }
    }

    pub fn principal_id(&self) -> &PrincipalId {
        &self.principal_id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

impl From<JwtClaims> for PrincipalContext {
    fn from(claims: JwtClaims) -> Self {
        Self::new(claims.sub, claims.email)
    }
}

/// Who is calling: present on every request, anonymous when no token was sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext(Option<PrincipalContext>);

impl CallerContext {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn authenticated(principal: PrincipalContext) -> Self {
        Self(Some(principal))
    }

    pub fn principal(&self) -> Option<&PrincipalContext> {
        self.0.as_ref()
    }

    pub fn principal_id(&self) -> Option<&PrincipalId> {
        self.0.as_ref().map(PrincipalContext::principal_id)
    }
}
