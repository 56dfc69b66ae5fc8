use std::fmt;
use std::io::Error;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use derive_more::{From, Into};

/// A path resolved against the working directory with symlinks followed.
///
/// Parsing fails if the path does not exist, which makes this a convenient
/// command line argument type for directories that must already be there.
/// On Windows the result keeps its plain `C:\...` form instead of the verbatim
/// `\\?\C:\...` form whenever that form is representable.
#[derive(Clone, Debug, Into, From, PartialEq, Eq)]
pub struct CanonicalizedPathBuf(PathBuf);

impl CanonicalizedPathBuf {
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl FromStr for CanonicalizedPathBuf {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(dunce::canonicalize(s)?))
    }
}

impl AsRef<Path> for CanonicalizedPathBuf {
    fn as_ref(&self) -> &Path {
        self.0.as_ref()
    }
}

impl fmt::Display for CanonicalizedPathBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.display().fmt(f)
    }
}
