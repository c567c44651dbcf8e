#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    /// Accepts `local@domain.tld` shaped addresses without any whitespace.
    pub fn parse(s: String) -> Result<Self, String> {
        if !has_address_shape(&s) {
            return Err(format!("{} is not a valid subscriber email.", s));
        };
        Ok(Self(s))
    }

    /// Everything before the `@`.
    pub fn local_part(&self) -> &str {
        // parse guarantees exactly one '@'
        self.0.split('@').next().unwrap_or_default()
    }
}

fn has_address_shape(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // at least one dot with something on both sides of it
    domain
        .match_indices('.')
        .any(|(idx, _)| idx > 0 && idx + 1 < domain.len())
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
