use serde_json::Value;
use thiserror::Error;

use crate::{AccessDecision, AccessRules, Operation, PrincipalId};

/// Collection whose records are owned by the user they describe.
const USERS_RESOURCE: &str = "users";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: {operation} access to '{resource}'")]
    Forbidden { resource: String, operation: Operation },
}

/// A granted access, possibly limited to records the caller owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Unrestricted,
    OwnedBy(PrincipalId),
}

impl Authorization {
    /// Whether a record of `resource` falls inside this grant.
    pub fn permits(&self, resource: &str, record: &serde_json::Map<String, Value>) -> bool {
        match self {
            Authorization::Unrestricted => true,
            Authorization::OwnedBy(principal) => {
                principal.is_owner(record.get(owner_field(resource)))
            }
        }
    }

    pub fn is_restricted(&self) -> bool {
        matches!(self, Authorization::OwnedBy(_))
    }
}

/// Field naming a record's owner: `id` for users themselves, `userId` elsewhere.
pub fn owner_field(resource: &str) -> &'static str {
    if resource == USERS_RESOURCE { "id" } else { "userId" }
}

/// Authorize an operation on a resource for an optional caller.
///
/// - No IO
/// - No panics
/// - Record-level ownership is left to [`Authorization::permits`]
pub fn authorize(
    rules: &AccessRules,
    resource: &str,
    operation: Operation,
    principal: Option<&PrincipalId>,
) -> Result<Authorization, AuthzError> {
    let mode = rules.mode_for(resource);
    match (mode.decide(operation, principal.is_some()), principal) {
        (AccessDecision::Allow, _) => Ok(Authorization::Unrestricted),
        (AccessDecision::OwnerOnly, Some(p)) => Ok(Authorization::OwnedBy(p.clone())),
        (AccessDecision::Unauthenticated, _) | (AccessDecision::OwnerOnly, None) => {
            Err(AuthzError::Unauthenticated)
        }
        (AccessDecision::Forbidden, _) => Err(AuthzError::Forbidden {
            resource: resource.to_string(),
            operation,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccessMode;
    use serde_json::json;

    fn record(v: Value) -> serde_json::Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("record must be an object"),
        }
    }

    fn rules() -> AccessRules {
        AccessRules::default()
            .with_rule("carts", AccessMode::from_digits(600).unwrap())
            .with_rule("catalog", AccessMode::from_digits(444).unwrap())
    }

    #[test]
    fn anonymous_callers_may_read_public_resources_only() {
        let rules = rules();
        assert_eq!(
            authorize(&rules, "products", Operation::Read, None),
            Ok(Authorization::Unrestricted)
        );
        assert_eq!(
            authorize(&rules, "orders", Operation::Read, None),
            Err(AuthzError::Unauthenticated)
        );
        assert_eq!(
            authorize(&rules, "products", Operation::Write, None),
            Err(AuthzError::Unauthenticated)
        );
    }

    #[test]
    fn logged_in_callers_get_unrestricted_access_under_660() {
        let p = PrincipalId::from(1);
        assert_eq!(
            authorize(&rules(), "orders", Operation::Write, Some(&p)),
            Ok(Authorization::Unrestricted)
        );
    }

    #[test]
    fn owner_only_modes_restrict_to_owned_records() {
        let p = PrincipalId::from(1);
        let grant = authorize(&rules(), "carts", Operation::Read, Some(&p)).unwrap();
        assert!(grant.is_restricted());
        assert!(grant.permits("carts", &record(json!({ "id": 9, "userId": 1 }))));
        assert!(!grant.permits("carts", &record(json!({ "id": 9, "userId": 2 }))));
        assert!(!grant.permits("carts", &record(json!({ "id": 9 }))));
    }

    #[test]
    fn users_are_owned_by_themselves() {
        let p = PrincipalId::from(4);
        let grant = Authorization::OwnedBy(p);
        assert!(grant.permits("users", &record(json!({ "id": 4, "email": "a@b.c" }))));
        assert!(!grant.permits("users", &record(json!({ "id": 5, "userId": 4 }))));
    }

    #[test]
    fn read_only_modes_forbid_writes() {
        let p = PrincipalId::from(1);
        assert_eq!(
            authorize(&rules(), "catalog", Operation::Write, Some(&p)),
            Err(AuthzError::Forbidden {
                resource: "catalog".into(),
                operation: Operation::Write
            })
        );
    }

    #[test]
    fn unlisted_resources_are_open() {
        assert_eq!(
            authorize(&rules(), "reviews", Operation::Write, None),
            Ok(Authorization::Unrestricted)
        );
    }
}
