/// HTTP verbs the validation pipeline distinguishes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
        }
    }
}

impl core::fmt::Display for Verb {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verb and path of the request a body belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestTarget<'a> {
    pub verb: Verb,
    pub path: &'a str,
}

impl<'a> RequestTarget<'a> {
    pub fn new(verb: Verb, path: &'a str) -> Self {
        Self { verb, path }
    }

    pub fn is(&self, verb: Verb, path: &str) -> bool {
        self.verb == verb && self.path == path
    }
}
