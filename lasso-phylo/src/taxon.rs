use color_eyre::eyre::{eyre, Report, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A stable integer identifier of a [`Taxon`].
///
/// Input taxa use positive ids, internal nodes synthesized during clustering use negative ids.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct TaxonId(pub i32);

#[rustfmt::skip]
impl Display for TaxonId { fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) } }
#[rustfmt::skip]
impl From<i32> for TaxonId { fn from(id: i32) -> Self { TaxonId(id) } }

impl TaxonId {
    /// Returns `true` if the id belongs to a synthesized internal node.
    pub fn is_internal(&self) -> bool {
        self.0 < 0
    }
}

impl FromStr for TaxonId {
    type Err = Report;
    fn from_str(s: &str) -> Result<TaxonId, Report> {
        s.trim().parse::<i32>().map(TaxonId).map_err(|_| eyre!("Failed to parse taxon id from str: {s}"))
    }
}

/// A [`Taxon`] in a distance graph or a [`Phylogeny`](crate::Phylogeny).
///
/// Equality and hashing only consider the [`TaxonId`], the name is for display.
///
/// ```rust
/// use lasso_phylo::Taxon;
/// assert_eq!(Taxon::new(1, "A"), Taxon::new(1, "renamed"));
/// assert_ne!(Taxon::new(1, "A"), Taxon::new(2, "A"));
/// assert_eq!(Taxon::internal(-3).to_string(), "NODE_3");
/// ```
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Taxon {
    /// Stable identifier.
    pub id: TaxonId,
    /// Label for display.
    pub name: String,
}

#[rustfmt::skip]
impl PartialEq for Taxon { fn eq(&self, other: &Self) -> bool { self.id == other.id } }
impl Eq for Taxon {}
#[rustfmt::skip]
impl Hash for Taxon { fn hash<H: Hasher>(&self, state: &mut H) { self.id.hash(state) } }
#[rustfmt::skip]
impl Display for Taxon { fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.name) } }

impl Taxon {
    /// Returns a new [`Taxon`] with an id and a display name.
    pub fn new(id: impl Into<TaxonId>, name: impl Into<String>) -> Self {
        Taxon { id: id.into(), name: name.into() }
    }

    /// Returns a synthesized internal node, named after its (negative) id.
    pub fn internal(id: impl Into<TaxonId>) -> Self {
        let id = id.into();
        Taxon { id, name: format!("NODE_{}", id.0.unsigned_abs()) }
    }

    /// Returns `true` if this is a synthesized internal node.
    pub fn is_internal(&self) -> bool {
        self.id.is_internal()
    }
}
