use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, Canvas};

use crate::geometry::Bounds;
use crate::rtree::{Index, NodeEntries, RTree};

pub struct TreeRenderOptions {
    width: u32,
    height: u32,
    threshold: Option<usize>,
}

impl TreeRenderOptions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            threshold: None,
        }
    }

    /// Only renders the bounds of nodes at depth `threshold`.
    pub fn with_threshold(&mut self, threshold: usize) -> &mut Self {
        self.threshold = Some(threshold);

        self
    }

    /// Renders the bounds of every node.
    pub fn without_threshold(&mut self) -> &mut Self {
        self.threshold = None;

        self
    }

    pub fn draw_tree<P: AsRef<Path>>(&self, filename: P, tree: &RTree, index: Index) {
        draw_tree(filename, tree, index, self);
    }
}

/// Draws the bounds of the subtree rooted at `index` into a raster image.
///
/// # Panics
/// This function will panic unless `tree` is 2-dimensional.
pub fn draw_tree<P: AsRef<Path>>(
    filename: P,
    tree: &RTree,
    index: Index,
    options: &TreeRenderOptions,
) {
    assert_eq!(
        tree.dimension(),
        2,
        "raster rendering is only defined for 2-dimensional trees"
    );

    let mut img = RgbImage::new(options.width, options.height);
    let mut dirty = false;

    render_node(&mut img, &mut dirty, tree, index, 0, options.threshold);

    // only render an image if theres actually something to render
    if dirty {
        img.save(filename.as_ref()).unwrap();
    }
}

const BUFFER_WIDTH: f32 = 1.0;

fn render_node(
    canvas: &mut RgbImage,
    dirty: &mut bool,
    tree: &RTree,
    index: Index,
    level: usize,
    threshold: Option<usize>,
) {
    // If a threshold is set and we exceed it, stop rendering.
    if let Some(threshold) = threshold {
        if level > threshold {
            return;
        }
    }

    // Render all children of this node
    if let NodeEntries::Children(children) = tree.get_node(index).entries() {
        for &child in children {
            render_node(canvas, dirty, tree, child, level + 1, threshold);
        }
    }

    // If we don't have a threshold or we are at the given threshold,
    // render the bounds of this node.
    if threshold.is_none() || threshold == Some(level) {
        *dirty = true;
        draw_bounds(canvas, tree.get_node(index).bounds(), level);
    }
}

fn draw_line<C: Canvas<Pixel = Rgb<u8>>>(
    canvas: &mut C,
    level: usize,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
) {
    let colors = [
        Rgb([128u8, 21u8, 21u8]),
        Rgb([40u8, 180u8, 120u8]),
        Rgb([59u8, 49u8, 118u8]),
        Rgb([170u8, 108u8, 57u8]),
        Rgb([86u8, 119u8, 20u8]),
        Rgb([70u8, 50u8, 160u8]),
    ];

    draw_line_segment_mut(canvas, (x0, y0), (x1, y1), colors[level % colors.len()]);
}

fn draw_bounds(canvas: &mut RgbImage, bounds: &Bounds, level: usize) {
    let (x0, x1) = bounds.interval(0);
    let (y0, y1) = bounds.interval(1);

    // inset each level slightly so nested boxes stay distinguishable
    let inset = BUFFER_WIDTH * level as f32;
    let x0 = x0 as f32 + inset;
    let y0 = y0 as f32 + inset;
    let x1 = x1 as f32 - inset;
    let y1 = y1 as f32 - inset;

    draw_line(canvas, level, x0, y0, x0, y1);
    draw_line(canvas, level, x0, y1, x1, y1);
    draw_line(canvas, level, x1, y1, x1, y0);
    draw_line(canvas, level, x1, y0, x0, y0);
}
