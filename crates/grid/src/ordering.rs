//! Tile visiting orders for the dissolve sequences.

use dissolve_common::TileCoord;
use rand::Rng;
use rand::seq::SliceRandom;

/// A tile coordinate together with its distance from the grid center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileDistance {
    pub coord: TileCoord,
    pub distance: f32,
}

/// Geometric center of a `width` x `height` grid in tile units.
pub fn center(width: u32, height: u32) -> (f32, f32) {
    (
        (width as f32 - 1.0) / 2.0,
        (height as f32 - 1.0) / 2.0,
    )
}

/// Euclidean distance of `coord` from the grid center.
pub fn distance_from_center(width: u32, height: u32, coord: TileCoord) -> f32 {
    let (cx, cy) = center(width, height);
    let dx = coord.x as f32 - cx;
    let dy = coord.y as f32 - cy;
    (dx * dx + dy * dy).sqrt()
}

/// All coordinates in x-major order.
pub fn coords(width: u32, height: u32) -> impl Iterator<Item = TileCoord> {
    (0..width).flat_map(move |x| (0..height).map(move |y| TileCoord::new(x, y)))
}

/// Every tile sorted ascending by distance from the center. Equal distances
/// keep coordinate order.
pub fn sorted_by_distance(width: u32, height: u32) -> Vec<TileDistance> {
    let mut tiles: Vec<TileDistance> = coords(width, height)
        .map(|coord| TileDistance {
            coord,
            distance: distance_from_center(width, height, coord),
        })
        .collect();
    tiles.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.coord.cmp(&b.coord))
    });
    tiles
}

/// Center-out order.
pub fn center_out(width: u32, height: u32) -> Vec<TileCoord> {
    sorted_by_distance(width, height)
        .into_iter()
        .map(|t| t.coord)
        .collect()
}

/// Edge-in order: the exact reverse of [`center_out`].
pub fn edge_in(width: u32, height: u32) -> Vec<TileCoord> {
    let mut order = center_out(width, height);
    order.reverse();
    order
}

/// Every tile exactly once, in random order.
pub fn random_order<R: Rng + ?Sized>(width: u32, height: u32, rng: &mut R) -> Vec<TileCoord> {
    let mut order: Vec<TileCoord> = coords(width, height).collect();
    order.shuffle(rng);
    order
}
