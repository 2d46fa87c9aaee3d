use super::Location;
use crate::payload::{MergedPayload, RawRequest};
use crate::schema::SchemaDescriptor;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Merge strategy bound to an endpoint.
///
/// Sources are listed lowest precedence first; each later source overwrites
/// overlapping keys of the earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderKind {
    Body,
    Query,
    Path,
    BodyAndPath,
    BodyAndQuery,
    BodyQueryAndPath,
}

impl LoaderKind {
    pub const ALL: [LoaderKind; 6] = [
        LoaderKind::Body,
        LoaderKind::Query,
        LoaderKind::Path,
        LoaderKind::BodyAndPath,
        LoaderKind::BodyAndQuery,
        LoaderKind::BodyQueryAndPath,
    ];

    /// Locations in ascending precedence
    #[must_use]
    pub fn sources(self) -> &'static [Location] {
        match self {
            LoaderKind::Body => &[Location::Body],
            LoaderKind::Query => &[Location::Query],
            LoaderKind::Path => &[Location::Path],
            LoaderKind::BodyAndPath => &[Location::Body, Location::Path],
            LoaderKind::BodyAndQuery => &[Location::Body, Location::Query],
            LoaderKind::BodyQueryAndPath => &[Location::Body, Location::Query, Location::Path],
        }
    }

    /// Read every source and merge them.
    ///
    /// Absent sources contribute nothing and never reset what lower sources
    /// already put in; the result is never absent.
    #[must_use]
    pub fn load(self, request: &RawRequest, schema: &SchemaDescriptor) -> MergedPayload {
        let mut merged = MergedPayload::new();
        for location in self.sources() {
            match location.read(request, schema) {
                Some(partial) => {
                    debug!(
                        loader = %self,
                        location = %location,
                        keys = partial.len(),
                        "Location contributed arguments"
                    );
                    merge_into(&mut merged, partial);
                }
                None => {
                    debug!(loader = %self, location = %location, "Location absent");
                }
            }
        }
        merged
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LoaderKind::Body => "json",
            LoaderKind::Query => "query",
            LoaderKind::Path => "view_args",
            LoaderKind::BodyAndPath => "json_and_view_args",
            LoaderKind::BodyAndQuery => "json_and_query",
            LoaderKind::BodyQueryAndPath => "json_and_query_and_view_args",
        }
    }
}

/// Overwrite-and-extend `acc` with a higher-precedence mapping
pub fn merge_into(acc: &mut MergedPayload, higher: MergedPayload) {
    for (key, value) in higher {
        acc.insert(key, value);
    }
}

impl fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoaderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        LoaderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("unknown loader '{s}'"))
    }
}
