//! SVN revisions and the check that compares the working copy against the
//! revision recorded on the current branch.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// A point in the SVN history.
///
/// An unknown revision is represented as `Option<Revision>::None`, never as
/// zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(u64);

impl Revision {
    pub const fn new(number: u64) -> Self {
        Self(number)
    }

    pub const fn number(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Revision {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Revision)
    }
}

/// Outcome of comparing the working copy revision with the branch revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionCheck {
    /// One side could not be determined; treated as "proceed".
    Unknown,
    /// Both sides agree.
    InSync,
    /// The working copy is ahead of the branch: the branch needs a rebase.
    Behind { branch: Revision, svn: Revision },
    /// The branch claims a newer revision than the working copy.
    Ahead { branch: Revision, svn: Revision },
}

impl RevisionCheck {
    /// Compare the revision reported by `svn info` with the one recorded in
    /// the branch history.
    pub fn compare(svn: Option<Revision>, branch: Option<Revision>) -> Self {
        match (svn, branch) {
            (Some(svn), Some(branch)) if svn > branch => RevisionCheck::Behind { branch, svn },
            (Some(svn), Some(branch)) if svn < branch => RevisionCheck::Ahead { branch, svn },
            (Some(_), Some(_)) => RevisionCheck::InSync,
            _ => RevisionCheck::Unknown,
        }
    }
}
