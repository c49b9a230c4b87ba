//! Walking footpaths between nearby stops

use geo::{Distance, Haversine, Point};
use log::{debug, info};
use rayon::prelude::*;
use rstar::{AABB, RTree, primitives::GeomWithData};

use crate::{StopIdx, Time, model::Footpath};

const METERS_PER_DEGREE: f64 = 111_320.0;

type IndexedStop = GeomWithData<[f64; 2], StopIdx>;

/// Footpaths between every pair of distinct stops reachable on foot within
/// `max_time` seconds, using great-circle distance.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub(crate) fn generate_footpaths(
    locations: &[Point<f64>],
    max_time: Time,
    walking_speed: f64,
) -> Vec<Footpath> {
    if max_time == 0 || walking_speed <= 0.0 {
        return Vec::new();
    }
    let max_distance = f64::from(max_time) * walking_speed;
    info!(
        "Generating footpaths between {} stops within {max_distance:.0} m",
        locations.len()
    );

    let tree = RTree::bulk_load(
        locations
            .iter()
            .enumerate()
            .map(|(idx, point)| IndexedStop::new([point.x(), point.y()], idx))
            .collect(),
    );

    let footpaths: Vec<Footpath> = locations
        .par_iter()
        .enumerate()
        .flat_map_iter(|(source, point)| {
            let envelope = search_envelope(*point, max_distance);
            tree.locate_in_envelope(&envelope)
                .filter(|candidate| candidate.data != source)
                .filter_map(|candidate| {
                    let [x, y] = *candidate.geom();
                    let distance = Haversine.distance(*point, Point::new(x, y));
                    (distance <= max_distance).then(|| Footpath {
                        source,
                        target: candidate.data,
                        duration: (distance / walking_speed).ceil() as Time,
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect();

    debug!("Generated {} footpaths", footpaths.len());
    footpaths
}

/// Bounding box around `point` covering at least `radius` meters
fn search_envelope(point: Point<f64>, radius: f64) -> AABB<[f64; 2]> {
    let lat_delta = radius / METERS_PER_DEGREE;
    let lon_delta = radius / (METERS_PER_DEGREE * point.y().to_radians().cos().max(0.01));
    AABB::from_corners(
        [point.x() - lon_delta, point.y() - lat_delta],
        [point.x() + lon_delta, point.y() + lat_delta],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearby_stops_are_connected_both_ways() {
        // ~111 m apart along a meridian
        let locations = vec![
            Point::new(37.6, 55.75),
            Point::new(37.6, 55.751),
            Point::new(37.7, 55.75),
        ];
        let footpaths = generate_footpaths(&locations, 300, 1.0);

        assert_eq!(footpaths.len(), 2);
        assert!(footpaths.iter().all(|fp| fp.source != 2 && fp.target != 2));
        for footpath in &footpaths {
            assert!((110..=113).contains(&footpath.duration));
        }
    }

    #[test]
    fn zero_walking_time_generates_nothing() {
        let locations = vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0001)];
        assert!(generate_footpaths(&locations, 0, 1.3).is_empty());
    }
}
