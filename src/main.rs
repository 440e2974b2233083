use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader};

use anyhow::{bail, Context, Result};
use tracing::{warn, Level};

use gridindex::rtree::{Index, NodeEntries, RTree};

/// Tree parameters used by the command-line tool: 2-dimensional tuples,
/// nodes holding between 2 and 4 entries.
const DIMENSION: usize = 2;
const MIN_ENTRIES: usize = 2;
const MAX_ENTRIES: usize = 4;

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        bail!("usage: {} <tuples-file>", args[0]);
    }

    let mut tree = RTree::new(DIMENSION, MIN_ENTRIES, MAX_ENTRIES)?;
    let inserted = read_tuples(&mut tree, &args[1])?;

    println!("inserted {inserted} tuple(s)");
    print_tree(&tree);

    Ok(())
}

/// Logging stays off unless GRIDINDEX_DEBUG is set to something truthy.
fn init_logging() {
    let enabled = env::var("GRIDINDEX_DEBUG")
        .map_or(false, |v| !(v.is_empty() || v == "0" || v == "false"));
    if enabled {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .init();
    }
}

/// Streams whitespace-separated integers from the file at `path`,
/// inserting every complete group of `tree.dimension()` values as one
/// tuple. Returns the number of tuples inserted.
///
/// Reading stops at the first malformed value; a trailing partial tuple
/// is discarded. Both are logged, and neither undoes the insertions made
/// up to that point.
fn read_tuples(tree: &mut RTree, path: &str) -> Result<usize> {
    let file = File::open(path).with_context(|| format!("failed to open {path}"))?;

    let mut values: Vec<i32> = Vec::with_capacity(tree.dimension());
    let mut inserted = 0;
    'stream: for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("failed to read {path}"))?;
        for token in line.split_whitespace() {
            let value: i32 = match token.parse() {
                Ok(value) => value,
                Err(_) => {
                    warn!("stopping at malformed value {token:?}");
                    break 'stream;
                }
            };

            values.push(value);
            if values.len() == tree.dimension() {
                tree.insert(std::mem::take(&mut values))?;
                inserted += 1;
            }
        }
    }

    if !values.is_empty() {
        warn!(
            "discarding trailing tuple with {} of {} coordinates",
            values.len(),
            tree.dimension()
        );
    }

    Ok(inserted)
}

fn print_tree(tree: &RTree) {
    match tree.root_index() {
        None => println!("tree is empty"),
        Some(root) => print_node(tree, root, 0),
    }
}

/// Prints one indented line per node: leaves list their tuples, internal
/// nodes their child count and bounds.
fn print_node(tree: &RTree, index: Index, depth: usize) {
    let node = tree.get_node(index);
    print!("{}[{}] ", " ".repeat(depth), depth);
    match node.entries() {
        NodeEntries::Tuples(tuples) => {
            let rendered: Vec<String> = tuples.iter().map(|t| t.to_string()).collect();
            println!("leaf: {}", rendered.join(" "));
        }
        NodeEntries::Children(children) => {
            println!(
                "node with {} children, bounds {}",
                children.len(),
                node.bounds()
            );
            for &child in children {
                print_node(tree, child, depth + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;

    fn write_fixture(name: &str, contents: &str) -> PathBuf {
        let mut path = env::temp_dir();
        path.push(format!("gridindex-{}-{name}", std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_whitespace_separated_tuples() {
        let path = write_fixture("plain", "0 0 10 0\n0 10\n10 10");
        let mut tree = RTree::new(DIMENSION, MIN_ENTRIES, MAX_ENTRIES).unwrap();

        let inserted = read_tuples(&mut tree, path.to_str().unwrap()).unwrap();
        assert_eq!(inserted, 4);
        assert_eq!(tree.len(), 4);
        tree.validate_consistency();
    }

    #[test]
    fn discards_trailing_partial_tuple() {
        let path = write_fixture("partial", "1 2 3 4 5");
        let mut tree = RTree::new(DIMENSION, MIN_ENTRIES, MAX_ENTRIES).unwrap();

        let inserted = read_tuples(&mut tree, path.to_str().unwrap()).unwrap();
        assert_eq!(inserted, 2);
        tree.validate_consistency();
    }

    #[test]
    fn stops_at_malformed_value_keeping_the_prefix() {
        let path = write_fixture("malformed", "1 2 3 4 oops 5 6");
        let mut tree = RTree::new(DIMENSION, MIN_ENTRIES, MAX_ENTRIES).unwrap();

        let inserted = read_tuples(&mut tree, path.to_str().unwrap()).unwrap();
        assert_eq!(inserted, 2);
        tree.validate_consistency();
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut tree = RTree::new(DIMENSION, MIN_ENTRIES, MAX_ENTRIES).unwrap();
        assert!(read_tuples(&mut tree, "/no/such/file").is_err());
    }
}
