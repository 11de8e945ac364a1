//! Great-circle distances between coordinates (x = lon, y = lat).

use geo::Point;
use rayon::prelude::*;

const EARTH_RADIUS_KM: f64 = 6371.0;

fn haversine_km(a: Point<f64>, b: Point<f64>) -> f64 {
    let (lat1, lon1) = (a.y().to_radians(), a.x().to_radians());
    let (lat2, lon2) = (b.y().to_radians(), b.x().to_radians());
    let h = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Distances in kilometres from one point to many.
pub fn haversine(origin: Point<f64>, points: &[Point<f64>]) -> Vec<f64> {
    points.iter().map(|&p| haversine_km(origin, p)).collect()
}

/// Symmetric all-pairs distance matrix in kilometres, zero on the diagonal.
pub fn haversine_matrix(points: &[Point<f64>]) -> Vec<Vec<f64>> {
    points
        .par_iter()
        .map(|&a| points.iter().map(|&b| haversine_km(a, b)).collect())
        .collect()
}
