//! Renders a [`Tree`] as a [Graphviz] `digraph` so its shape can be inspected, e.g. with
//! `dot -Tpng tree.dot -o tree.png`.
//!
//! Nodes are numbered in pre-order, starting from 0 on every call. Missing children are drawn
//! as points so the left/right position of every child stays visible.
//!
//! [Graphviz]: https://graphviz.org/doc/info/lang.html

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::{info, instrument};

use crate::error::ExportError;
use crate::tree::{NodeRef, Tree};

/// Writes the graph description of `tree` to `out`.
///
/// # Examples
///
/// ```
/// use treeset::{dot, Mode, Tree};
///
/// let mut tree = Tree::new(Mode::Balanced);
/// tree.insert(1).unwrap();
///
/// let mut out = Vec::new();
/// dot::write_dot(&tree, &mut out).unwrap();
///
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "digraph {\n    \
///          0 [color=black label=\"1\"]\n    \
///          1 [shape=point];\n    \
///          0 -> 1 [label=\"l\"]\n    \
///          2 [shape=point];\n    \
///          0 -> 2 [label=\"r\"]\n\
///      }\n"
/// );
/// ```
pub fn write_dot<W: Write>(tree: &Tree, out: &mut W) -> io::Result<()> {
    writeln!(out, "digraph {{")?;
    if let Some(root) = tree.root() {
        let mut writer = DotWriter {
            out: &mut *out,
            next_id: 0,
        };
        writer.walk(root)?;
    }
    writeln!(out, "}}")
}

/// Writes the graph description of `tree` to the file at `path`, replacing whatever was there.
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn export_dot(tree: &Tree, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| ExportError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut out = BufWriter::new(file);
    write_dot(tree, &mut out)
        .and_then(|()| out.flush())
        .map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    info!(nodes = tree.len(), "exported tree");
    Ok(())
}

/// Hands out node ids for a single export.
struct DotWriter<'w, W> {
    out: &'w mut W,
    next_id: usize,
}

/// Work left to do while walking the tree.
enum Step<'t> {
    /// Write a node (or an empty slot) and queue everything below it. `parent` is the edge
    /// leading to it, if it isn't the root.
    Visit {
        node: Option<NodeRef<'t>>,
        parent: Option<(usize, &'static str)>,
    },
    /// Write the edge into a subtree once the whole subtree has been written.
    Edge {
        from: usize,
        to: usize,
        side: &'static str,
    },
}

impl<W: Write> DotWriter<'_, W> {
    /// Writes `root` and everything below it in pre-order. Each edge follows the subtree it
    /// leads to. Uses its own stack, so unbalanced chains of any depth can be written.
    fn walk(&mut self, root: NodeRef<'_>) -> io::Result<()> {
        let mut steps = vec![Step::Visit {
            node: Some(root),
            parent: None,
        }];

        while let Some(step) = steps.pop() {
            let (node, parent) = match step {
                Step::Edge { from, to, side } => {
                    self.edge(from, to, side)?;
                    continue;
                }
                Step::Visit { node, parent } => (node, parent),
            };

            let id = self.next_id;
            self.next_id += 1;

            let Some(node) = node else {
                writeln!(self.out, "    {id} [shape=point];")?;
                if let Some((from, side)) = parent {
                    self.edge(from, id, side)?;
                }
                continue;
            };

            writeln!(self.out, "    {id} [color=black label=\"{}\"]", node.key())?;

            if let Some((from, side)) = parent {
                steps.push(Step::Edge { from, to: id, side });
            }
            steps.push(Step::Visit {
                node: node.right(),
                parent: Some((id, "r")),
            });
            steps.push(Step::Visit {
                node: node.left(),
                parent: Some((id, "l")),
            });
        }
        Ok(())
    }

    fn edge(&mut self, from: usize, to: usize, side: &str) -> io::Result<()> {
        writeln!(self.out, "    {from} -> {to} [label=\"{side}\"]")
    }
}
