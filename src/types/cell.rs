//! Hexagonal cells and their boundary polygons.

use crate::types::station::LatLon;
use h3o::{CellIndex, LatLng};
use std::fmt;

/// Tolerance, in degrees, used when checking that a point lies inside the boundary of the
/// cell it was indexed to.
///
/// Cell edges are geodesic while [`CellBoundary::contains`] tests a planar polygon in
/// lon/lat space. Points within this distance of an edge are treated as contained.
pub const BOUNDARY_TOLERANCE_DEG: f64 = 1e-2;

/// A hexagonal (or, at the twelve icosahedron vertices, pentagonal) cell of the H3 grid.
///
/// The identifier returned by [`HexCell::id`] encodes both the resolution and the
/// position, and is the key used in every frame column (`cell_id`, `neighbor_i`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexCell(CellIndex);

impl HexCell {
    pub fn new(index: CellIndex) -> Self {
        Self(index)
    }

    pub fn index(&self) -> CellIndex {
        self.0
    }

    /// The canonical lowercase hexadecimal identifier, e.g. `831f8dfffffffff`.
    pub fn id(&self) -> String {
        self.0.to_string()
    }

    pub fn resolution(&self) -> u8 {
        u8::from(self.0.resolution())
    }

    /// The cell center.
    pub fn center(&self) -> LatLon {
        let center = LatLng::from(self.0);
        LatLon(center.lat(), center.lng())
    }

    /// The ordered vertices of the cell.
    pub fn boundary(&self) -> CellBoundary {
        CellBoundary {
            vertices: self
                .0
                .boundary()
                .iter()
                .map(|vertex| LatLon(vertex.lat(), vertex.lng()))
                .collect(),
        }
    }

    /// Integer value of the index, used as the canonical ordering key.
    pub(crate) fn sort_key(&self) -> u64 {
        u64::from(self.0)
    }
}

impl fmt::Display for HexCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialOrd for HexCell {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HexCell {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// The vertex ring of a cell, in the order produced by the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CellBoundary {
    vertices: Vec<LatLon>,
}

impl CellBoundary {
    pub fn vertices(&self) -> &[LatLon] {
        &self.vertices
    }

    /// GeoJSON-style closed ring of `[longitude, latitude]` pairs.
    ///
    /// The first vertex is repeated at the end.
    pub fn closed_ring(&self) -> Vec<Vec<f64>> {
        let mut ring: Vec<Vec<f64>> = self
            .vertices
            .iter()
            .map(|vertex| vec![vertex.1, vertex.0])
            .collect();
        if let Some(first) = ring.first().cloned() {
            if ring.last() != Some(&first) {
                ring.push(first);
            }
        }
        ring
    }

    /// Planar point-in-polygon test in lon/lat space.
    ///
    /// Points outside the polygon but within `tolerance_deg` of one of its edges also
    /// count as contained. Cells crossing the antimeridian are not supported.
    pub fn contains(&self, point: LatLon, tolerance_deg: f64) -> bool {
        let (px, py) = (point.1, point.0);
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = (self.vertices[i].1, self.vertices[i].0);
            let (xj, yj) = (self.vertices[j].1, self.vertices[j].0);
            if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        if inside {
            return true;
        }

        (0..n).any(|i| {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            segment_distance((px, py), (a.1, a.0), (b.1, b.0)) <= tolerance_deg
        })
    }
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_2 = dx * dx + dy * dy;
    let t = if len_2 == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_2).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}
