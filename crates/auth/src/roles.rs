/// The three audiences an access mode grants rights to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Audience {
    /// The authenticated caller owns the record.
    Owner,
    /// Any authenticated caller.
    LoggedIn,
    /// Anyone, token or not.
    Public,
}

impl Audience {
    /// Widest audience first, the order access decisions are made in.
    pub const BROADEST_FIRST: [Audience; 3] = [Audience::Public, Audience::LoggedIn, Audience::Owner];
}
