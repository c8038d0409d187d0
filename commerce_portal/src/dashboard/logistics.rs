//! Customer density heatmap
//!
//! Geolocation points are binned into a regular grid over the configured
//! bounding box. Each occupied cell gets a colour from a five-step viridis
//! ramp scaled to the busiest cell.

use crate::config::GeoBounds;
use crate::store::{GeoPoint, Store};
use crate::{PortalError, Result};
use serde::Serialize;

/// Map centre (lat, lng) over the country
pub const MAP_CENTER: (f64, f64) = (-15.78, -47.92);
pub const MAP_ZOOM: u8 = 3;
pub const GRID_SIZE: usize = 20;
pub const VIRIDIS: [&str; 5] = ["#440154", "#3b528b", "#21918c", "#5ec962", "#fde725"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center_lat: MAP_CENTER.0,
            center_lng: MAP_CENTER.1,
            zoom: MAP_ZOOM,
        }
    }
}

/// One occupied grid cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    pub row: usize,
    pub col: usize,
    /// Cell centre
    pub lat: f64,
    pub lng: f64,
    pub count: usize,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapGrid {
    pub bounds: GeoBounds,
    pub size: usize,
    /// Occupied cells in row-major order
    pub cells: Vec<HeatCell>,
    /// Points that fell outside the bounding box
    pub outside: usize,
}

impl HeatmapGrid {
    pub fn build(points: &[GeoPoint], bounds: GeoBounds, size: usize) -> Self {
        let size = size.max(1);
        let lat_step = (bounds.lat_max - bounds.lat_min) / size as f64;
        let lng_step = (bounds.lng_max - bounds.lng_min) / size as f64;

        let mut counts = vec![0usize; size * size];
        let mut outside = 0;
        for point in points {
            if !bounds.contains(point.lat, point.lng) {
                outside += 1;
                continue;
            }
            let row = bin(point.lat - bounds.lat_min, lat_step, size);
            let col = bin(point.lng - bounds.lng_min, lng_step, size);
            counts[row * size + col] += 1;
        }

        let max = counts.iter().copied().max().unwrap_or(0);
        let cells = counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(idx, &count)| {
                let (row, col) = (idx / size, idx % size);
                HeatCell {
                    row,
                    col,
                    lat: bounds.lat_min + (row as f64 + 0.5) * lat_step,
                    lng: bounds.lng_min + (col as f64 + 0.5) * lng_step,
                    count,
                    color: color_for(count, max),
                }
            })
            .collect();

        Self {
            bounds,
            size,
            cells,
            outside,
        }
    }

    /// Points counted inside the grid
    pub fn total(&self) -> usize {
        self.cells.iter().map(|c| c.count).sum()
    }

    /// Busiest cell, earliest in row-major order on ties
    pub fn hottest(&self) -> Option<&HeatCell> {
        self.cells
            .iter()
            .fold(None, |best: Option<&HeatCell>, cell| match best {
                Some(b) if b.count >= cell.count => Some(b),
                _ => Some(cell),
            })
    }
}

fn bin(offset: f64, step: f64, size: usize) -> usize {
    if step <= 0.0 {
        return 0;
    }
    ((offset / step).floor().max(0.0) as usize).min(size - 1)
}

fn color_for(count: usize, max: usize) -> &'static str {
    if max == 0 {
        return VIRIDIS[0];
    }
    let steps = (VIRIDIS.len() - 1) as f64;
    let idx = ((count as f64 / max as f64) * steps).round() as usize;
    VIRIDIS[idx.min(VIRIDIS.len() - 1)]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogisticsPanel {
    pub view: MapView,
    pub point_count: usize,
    pub grid: HeatmapGrid,
}

pub fn build(store: &Store, bounds: &GeoBounds) -> Result<LogisticsPanel> {
    let points = store.geolocation_points()?;
    if points.is_empty() {
        return Err(PortalError::EmptyResult(
            "No geolocation points to map.".to_string(),
        ));
    }

    Ok(LogisticsPanel {
        view: MapView::default(),
        point_count: points.len(),
        grid: HeatmapGrid::build(&points, *bounds, GRID_SIZE),
    })
}
