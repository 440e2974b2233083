use std::borrow::Cow;
use std::io;
use std::path::Path;

use crate::rtree::{Index, RTree};

type Nd = Index;
type Ed = (Index, Index);

impl<'a> dot::Labeller<'a, Nd, Ed> for RTree {
    fn graph_id(&'a self) -> dot::Id<'a> {
        dot::Id::new("gridindex").unwrap()
    }

    fn node_id(&'a self, n: &Nd) -> dot::Id<'a> {
        let node = self.get_node(*n);

        dot::Id::new(format!("N{}_{}", n.into_raw_parts().0, node.entry_count())).unwrap()
    }

    fn node_label(&'a self, n: &Nd) -> dot::LabelText<'a> {
        let node = self.get_node(*n);

        dot::LabelText::label(format!("{}", node.bounds()))
    }
}

impl<'a> dot::GraphWalk<'a, Nd, Ed> for RTree {
    fn nodes(&'a self) -> Cow<'a, [Nd]> {
        self.nodes.iter().map(|x| x.0).collect()
    }

    fn edges(&'a self) -> Cow<'a, [Ed]> {
        Cow::from(self.collect_edges())
    }

    fn source(&'a self, edge: &Ed) -> Nd {
        edge.0
    }

    fn target(&'a self, edge: &Ed) -> Nd {
        edge.1
    }
}

/// Renders the tree as a graphviz dotfile at `path`.
pub fn render_dot<P: AsRef<Path>>(tree: &RTree, path: P) -> io::Result<()> {
    let mut f = std::fs::File::create(path.as_ref())?;
    dot::render(tree, &mut f)
}
