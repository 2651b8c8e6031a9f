//! Inverse codings: geographic position to scene pixel.

use std::fmt::Debug;

use nalgebra::{Matrix2, Vector2, Vector3};
use rayon::prelude::*;
use tracing::trace;

use crate::forward::ForwardCoding;
use crate::grid::GeoGrid;
use crate::types::{GeoPos, PixelPos};

pub const INV_PIXEL_QUAD_TREE: &str = "INV_PIXEL_QUAD_TREE";
pub const INV_TIE_POINT: &str = "INV_TIE_POINT";

/// Nodes per axis of the coarse search index.
const COARSE_NODES_PER_AXIS: usize = 32;
/// Coarse candidates refined by local search.
const CANDIDATES: usize = 4;
const MAX_NEWTON_ITERATIONS: usize = 20;
const NEWTON_STEP: f64 = 0.25;

/// Maps geographic positions back to scene positions.
pub trait InverseCoding: Send + Sync + Debug {
    fn key(&self) -> &'static str;

    /// Build search structures for `grid`. Called once before any lookup.
    fn initialize(&mut self, grid: &GeoGrid);

    /// Scene position of a geographic position, `None` when it is not
    /// covered by the scene.
    fn geo_to_pixel(
        &self,
        grid: &GeoGrid,
        forward: &dyn ForwardCoding,
        geo: GeoPos,
    ) -> Option<PixelPos>;
}

/// Nearest-node search refined by Newton iteration on the forward mapping.
///
/// A coarse, regularly sampled subset of nodes picks starting points; a
/// hill climb with shrinking step finds the nearest node; for interpolating
/// forward codings Newton iteration in the tangent plane of the target then
/// solves for the continuous position.
#[derive(Debug, Clone)]
pub struct GridSearchInverse {
    key: &'static str,
    step: usize,
    coarse: Vec<(usize, usize)>,
    max_node_distance: f64,
}

impl GridSearchInverse {
    pub fn pixel_quad_tree() -> Self {
        Self::with_key(INV_PIXEL_QUAD_TREE)
    }

    pub fn tie_point() -> Self {
        Self::with_key(INV_TIE_POINT)
    }

    fn with_key(key: &'static str) -> Self {
        Self {
            key,
            step: 1,
            coarse: Vec::new(),
            max_node_distance: 0.0,
        }
    }

    fn distance(grid: &GeoGrid, i: usize, j: usize, target: &Vector3<f64>) -> f64 {
        let d = (grid.node_vector(i, j) - target).norm();
        if d.is_nan() {
            f64::INFINITY
        } else {
            d
        }
    }

    /// Local search from `(i, j)` towards the node nearest to `target`.
    fn climb(
        &self,
        grid: &GeoGrid,
        start: (usize, usize),
        target: &Vector3<f64>,
    ) -> ((usize, usize), f64) {
        let (w, h) = (grid.width() as isize, grid.height() as isize);
        let mut best = start;
        let mut best_distance = Self::distance(grid, start.0, start.1, target);
        let mut step = self.step as isize;

        loop {
            let mut moved = false;
            for dj in [-step, 0, step] {
                for di in [-step, 0, step] {
                    let i = (best.0 as isize + di).clamp(0, w - 1) as usize;
                    let j = (best.1 as isize + dj).clamp(0, h - 1) as usize;
                    let d = Self::distance(grid, i, j, target);
                    if d < best_distance {
                        best = (i, j);
                        best_distance = d;
                        moved = true;
                    }
                }
            }
            if !moved {
                if step == 1 {
                    break;
                }
                step = (step + 1) / 2;
            }
        }
        (best, best_distance)
    }

    /// Newton iteration on the interpolated grid, starting at `start`.
    fn refine(grid: &GeoGrid, start: PixelPos, target: &Vector3<f64>) -> Option<PixelPos> {
        let east = {
            let e = Vector3::z().cross(target);
            if e.norm() < 1e-9 {
                Vector3::x()
            } else {
                e.normalize()
            }
        };
        let north = target.cross(&east);
        let eval = |p: PixelPos| grid.interpolate(p).map(|g| g.to_unit_vector());

        let mut p = start;
        for iteration in 0..MAX_NEWTON_ITERATIONS {
            let v = eval(p)?;
            let vx = eval(PixelPos::new(p.x + NEWTON_STEP, p.y))?;
            let vy = eval(PixelPos::new(p.x, p.y + NEWTON_STEP))?;

            let r = v - target;
            let dx = (vx - v) / NEWTON_STEP;
            let dy = (vy - v) / NEWTON_STEP;
            let jacobian = Matrix2::new(dx.dot(&east), dy.dot(&east), dx.dot(&north), dy.dot(&north));
            let delta = jacobian.try_inverse()? * -Vector2::new(r.dot(&east), r.dot(&north));

            p = PixelPos::new(p.x + delta.x, p.y + delta.y);
            if delta.norm() < 1e-6 {
                trace!(iteration, x = p.x, y = p.y, "Inverse converged");
                break;
            }
        }
        Some(p)
    }
}

impl InverseCoding for GridSearchInverse {
    fn key(&self) -> &'static str {
        self.key
    }

    fn initialize(&mut self, grid: &GeoGrid) {
        let (w, h) = (grid.width(), grid.height());
        self.step = w.max(h).div_ceil(COARSE_NODES_PER_AXIS).max(1);

        let axis = |n: usize| {
            let mut nodes: Vec<usize> = (0..n).step_by(self.step).collect();
            if nodes.last() != Some(&(n - 1)) {
                nodes.push(n - 1);
            }
            nodes
        };
        let columns = axis(w);
        let rows = axis(h);
        self.coarse = rows
            .iter()
            .flat_map(|&j| columns.iter().map(move |&i| (i, j)))
            .filter(|&(i, j)| grid.node(i, j).is_valid())
            .collect();

        self.max_node_distance = (0..h)
            .into_par_iter()
            .map(|j| {
                let mut max: f64 = 0.0;
                for i in 0..w {
                    let v = grid.node_vector(i, j);
                    if i + 1 < w {
                        let d = (grid.node_vector(i + 1, j) - v).norm();
                        if d.is_finite() {
                            max = max.max(d);
                        }
                    }
                    if j + 1 < h {
                        let d = (grid.node_vector(i, j + 1) - v).norm();
                        if d.is_finite() {
                            max = max.max(d);
                        }
                    }
                }
                max
            })
            .reduce(|| 0.0, f64::max);
    }

    fn geo_to_pixel(
        &self,
        grid: &GeoGrid,
        forward: &dyn ForwardCoding,
        geo: GeoPos,
    ) -> Option<PixelPos> {
        if !geo.is_valid() || self.coarse.is_empty() {
            return None;
        }
        let target = geo.to_unit_vector();

        let mut candidates: Vec<((usize, usize), f64)> = self
            .coarse
            .iter()
            .map(|&(i, j)| ((i, j), Self::distance(grid, i, j, &target)))
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        let ((i, j), distance) = candidates
            .iter()
            .take(CANDIDATES)
            .map(|&(node, _)| self.climb(grid, node, &target))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        let (x, y) = grid.raster().scene_position(i, j);
        let node = PixelPos::new(x, y);

        if !forward.is_interpolating() {
            // Within reach of the nearest pixel centre only.
            return (distance <= self.max_node_distance && grid.contains(node)).then_some(node);
        }

        if distance > 2.0 * self.max_node_distance {
            return None;
        }
        let pixel = Self::refine(grid, node, &target)?;
        grid.contains(pixel).then_some(pixel)
    }
}
