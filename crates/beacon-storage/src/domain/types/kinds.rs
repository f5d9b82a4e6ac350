use std::fmt;

/// The kind of record an error or lookup refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Either kind of post, when the caller does not know which.
    Post,
    Beacon,
    Comment,
    User,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Post => "Post",
            EntityKind::Beacon => "Beacon",
            EntityKind::Comment => "Comment",
            EntityKind::User => "User",
        };
        f.write_str(name)
    }
}

/// A dedup-guarded vote a user can cast on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteKind {
    Heart,
    Flag,
}

impl VoteKind {
    /// Prefix of the per-post membership set.
    pub const fn set_prefix(&self) -> &'static str {
        match self {
            VoteKind::Heart => "hearted-by",
            VoteKind::Flag => "flagged-by",
        }
    }

    /// Counter field on the post record.
    pub const fn counter_field(&self) -> &'static str {
        match self {
            VoteKind::Heart => crate::domain::codec::fields::HEARTS,
            VoteKind::Flag => crate::domain::codec::fields::FLAGS,
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteKind::Heart => f.write_str("heart"),
            VoteKind::Flag => f.write_str("flag"),
        }
    }
}
