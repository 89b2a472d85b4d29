//! Access modes: three-digit permission masks in the style of file modes.
//!
//! Digits are, in order, owner / logged-in / public. Within a digit, `4`
//! grants read and `2` grants write, so `664` lets logged-in callers read and
//! write while anyone can read.

use core::str::FromStr;

use crate::Audience;
use crate::rules::AccessRuleError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Write,
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Operation::Read => "read",
            Operation::Write => "write",
        })
    }
}

/// One digit of an access mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Grant(u8);

impl Grant {
    const READ: u8 = 4;
    const WRITE: u8 = 2;

    pub fn from_digit(digit: u8) -> Option<Self> {
        (digit <= 7).then_some(Self(digit))
    }

    pub fn allows(&self, op: Operation) -> bool {
        let bit = match op {
            Operation::Read => Self::READ,
            Operation::Write => Self::WRITE,
        };
        self.0 & bit != 0
    }
}

/// What the caller must prove for an operation under a given mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    /// Allowed only on records the caller owns.
    OwnerOnly,
    /// No token, and the public audience has no grant.
    Unauthenticated,
    /// Authenticated, but no audience the caller belongs to has a grant.
    Forbidden,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AccessMode {
    owner: Grant,
    logged_in: Grant,
    public: Grant,
}

impl AccessMode {
    /// Anyone may read and write.
    pub const UNGUARDED: AccessMode = AccessMode {
        owner: Grant(6),
        logged_in: Grant(6),
        public: Grant(6),
    };

    /// `660`: any authenticated caller may read and write.
    pub const LOGGED_IN: AccessMode = AccessMode {
        owner: Grant(6),
        logged_in: Grant(6),
        public: Grant(0),
    };

    /// `664`: like [`AccessMode::LOGGED_IN`], and anyone may read.
    pub const PUBLIC_READ: AccessMode = AccessMode {
        owner: Grant(6),
        logged_in: Grant(6),
        public: Grant(4),
    };

    /// Build from the decimal spelling of the mode, e.g. `664`.
    pub fn from_digits(mode: u16) -> Result<Self, AccessRuleError> {
        mode.to_string().parse()
    }

    pub fn grant(&self, audience: Audience) -> Grant {
        match audience {
            Audience::Owner => self.owner,
            Audience::LoggedIn => self.logged_in,
            Audience::Public => self.public,
        }
    }

    /// Decide an operation for a caller that is (or is not) authenticated.
    ///
    /// Broader audiences win: a public grant needs no token, a logged-in grant
    /// needs any token, an owner grant needs ownership of the record.
    pub fn decide(&self, op: Operation, authenticated: bool) -> AccessDecision {
        let widest = Audience::BROADEST_FIRST
            .into_iter()
            .find(|audience| self.grant(*audience).allows(op));

        match (widest, authenticated) {
            (Some(Audience::Public), _) => AccessDecision::Allow,
            (_, false) => AccessDecision::Unauthenticated,
            (Some(Audience::LoggedIn), true) => AccessDecision::Allow,
            (Some(Audience::Owner), true) => AccessDecision::OwnerOnly,
            (None, true) => AccessDecision::Forbidden,
        }
    }
}

impl FromStr for AccessMode {
    type Err = AccessRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits: Vec<Grant> = s
            .bytes()
            .map(|b| {
                b.checked_sub(b'0')
                    .and_then(Grant::from_digit)
                    .ok_or_else(|| AccessRuleError::InvalidMode(s.to_string()))
            })
            .collect::<Result<_, _>>()?;

        match digits.as_slice() {
            [owner, logged_in, public] => Ok(Self {
                owner: *owner,
                logged_in: *logged_in,
                public: *public,
            }),
            _ => Err(AccessRuleError::InvalidMode(s.to_string())),
        }
    }
}

impl core::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{}{}", self.owner.0, self.logged_in.0, self.public.0)
    }
}
