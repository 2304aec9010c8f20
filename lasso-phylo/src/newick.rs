//! Read and write [Newick](https://en.wikipedia.org/wiki/Newick_format) strings.

use crate::{Branch, FromNewick, Phylogeny, Taxon};
use color_eyre::eyre::{eyre, Report, Result};
use num_traits::AsPrimitive;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Returns a [`Phylogeny`] of [`Taxon`] nodes and [`Branch`] lengths parsed from a Newick [`str`].
///
/// - Leaves are numbered `1, 2, ...` in order of appearance and must be named.
/// - Internal nodes are numbered `-1, -2, ...` in order of appearance, unnamed ones are
///   labelled after their id (ex. `NODE_1`).
///
/// # Examples
///
/// ```rust
/// use lasso_phylo::{newick, Taxon};
/// let phylo = newick::parse("(A:0.1,B:0.2,(C:0.3,D:0.4)E:0.5);")?;
/// let names: Vec<_> = phylo.get_nodes().iter().map(|t| t.to_string()).collect();
/// assert_eq!(names, ["NODE_1", "A", "B", "E", "C", "D"]);
/// assert_eq!(phylo.get_parent(&Taxon::new(3, "C"))?, Some(&Taxon::new(-2, "E")));
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn parse(newick: &str) -> Result<Phylogeny<Taxon, Branch>, Report> {
    let newick = newick.trim().trim_end_matches(';').trim();
    if newick.is_empty() {
        Err(eyre!("Failed to parse newick, the string is empty."))?
    }
    let mut phylo = Phylogeny::new();
    let mut counters = (0, 0);
    parse_node(newick, None, &mut phylo, &mut counters)?;
    Ok(phylo)
}

/// Parse one node of the newick string, and recurse into its children.
fn parse_node(
    newick: &str,
    parent: Option<&Taxon>,
    phylo: &mut Phylogeny<Taxon, Branch>,
    counters: &mut (i32, i32),
) -> Result<(), Report> {
    let newick = newick.trim();
    let (inner, attributes) = match newick.starts_with('(') {
        true => {
            let end = get_closing_parenthesis(newick)?;
            (Some(&newick[1..end]), &newick[end + 1..])
        }
        false => (None, newick),
    };

    let label = attributes.split(':').next().unwrap_or_default().trim();
    let branch = Branch::from_newick(attributes)?;

    let taxon = match inner {
        Some(_) => {
            counters.1 -= 1;
            match label.is_empty() {
                true => Taxon::internal(counters.1),
                false => Taxon::new(counters.1, label),
            }
        }
        None => {
            if label.is_empty() {
                Err(eyre!("Failed to parse newick, found a leaf without a name: {newick}"))?
            }
            counters.0 += 1;
            Taxon::new(counters.0, label)
        }
    };

    match parent {
        Some(parent) => _ = phylo.add_branch(parent.clone(), taxon.clone(), branch)?,
        None => _ = phylo.add_node(taxon.clone()),
    }

    if let Some(inner) = inner {
        split_top_level(inner)?
            .into_iter()
            .try_for_each(|child| parse_node(child, Some(&taxon), phylo, counters))?;
    }

    Ok(())
}

/// Get the index of the parenthesis closing the first opening one.
fn get_closing_parenthesis(newick: &str) -> Result<usize, Report> {
    let mut depth = 0;
    for (i, c) in newick.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => (),
        }
    }
    Err(eyre!("Failed to find matching outer parentheses from newick: {newick}"))
}

/// Split on the commas that are not nested inside parentheses.
fn split_top_level(newick: &str) -> Result<Vec<&str>, Report> {
    let mut parts = Vec::new();
    let (mut depth, mut start) = (0_i32, 0);
    for (i, c) in newick.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&newick[start..i]);
                start = i + 1;
            }
            _ => (),
        }
        if depth < 0 {
            Err(eyre!("Unbalanced parentheses in newick: {newick}"))?
        }
    }
    parts.push(&newick[start..]);
    Ok(parts)
}

/// Returns a Newick [`str`] of the tree below `root`, with branch lengths.
///
/// Nodes whose label displays as an empty string are written without a label.
///
/// ```rust
/// use lasso_phylo::{newick, Phylogeny};
/// let phylo = Phylogeny::from([("R", "A", 1.0), ("R", "X", 0.5), ("X", "B", 2.0), ("X", "C", 2.5)]);
/// assert_eq!(newick::write(&phylo, &"R")?, "(A:1,(B:2,C:2.5)X:0.5)R;");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn write<N, B>(phylo: &Phylogeny<N, B>, root: &N) -> Result<String, Report>
where
    N: Clone + Debug + Display + Eq + Hash + PartialEq,
    B: AsPrimitive<f64> + Debug + Display,
{
    let mut newick = write_node(phylo, root, None)?;
    newick.push(';');
    Ok(newick)
}

fn write_node<N, B>(phylo: &Phylogeny<N, B>, node: &N, length: Option<f64>) -> Result<String, Report>
where
    N: Clone + Debug + Display + Eq + Hash + PartialEq,
    B: AsPrimitive<f64> + Debug + Display,
{
    let children = phylo.get_children(node)?;
    let mut newick = String::new();
    if !children.is_empty() {
        let inner = children
            .into_iter()
            .map(|child| {
                let length: f64 = phylo.get_branch(node, child)?.as_();
                write_node(phylo, child, Some(length))
            })
            .collect::<Result<Vec<_>, Report>>()?;
        newick = format!("({})", inner.join(","));
    }
    newick.push_str(&node.to_string());
    if let Some(length) = length {
        newick.push_str(&format!(":{length}"));
    }
    Ok(newick)
}
