use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The kind of object stored.
///
/// The store treats the kind as an opaque tag: it is recorded on write and
/// handed back unchanged on read. Only the content hasher looks at it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectType {
    /// A commit object.
    Commit,
    /// A directory listing.
    Tree,
    /// Raw file content.
    Blob,
    /// An annotated tag.
    Tag,
    /// Packed delta against an object at a pack offset.
    OfsDelta,
    /// Packed delta against an object named by id.
    RefDelta,
}

impl ObjectType {
    /// Canonical name, as written into object headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Blob => "blob",
            Self::Tag => "tag",
            Self::OfsDelta => "ofs-delta",
            Self::RefDelta => "ref-delta",
        }
    }

    /// Returns `true` for kinds that can exist as standalone objects and
    /// therefore have a content hash. Delta kinds only exist inside packs.
    pub fn is_loose(&self) -> bool {
        matches!(self, Self::Commit | Self::Tree | Self::Blob | Self::Tag)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commit" => Ok(Self::Commit),
            "tree" => Ok(Self::Tree),
            "blob" => Ok(Self::Blob),
            "tag" => Ok(Self::Tag),
            "ofs-delta" => Ok(Self::OfsDelta),
            "ref-delta" => Ok(Self::RefDelta),
            other => Err(TypeError::UnknownType(other.to_string())),
        }
    }
}
