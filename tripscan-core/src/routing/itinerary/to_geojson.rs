use geo::{Coord, LineString, line_string};
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use super::{Journey, JourneyLeg};
use crate::{Error, RoutePathIdx, StopIdx, Time, TransitNetwork};

impl Journey {
    /// Converts the journey to a `GeoJSON` `FeatureCollection`, one feature per leg.
    pub fn to_geojson(&self, network: &TransitNetwork) -> Result<FeatureCollection, Error> {
        let features = self
            .legs
            .iter()
            .enumerate()
            .map(|(idx, leg)| match leg {
                JourneyLeg::Transit {
                    route_id,
                    trip_id,
                    route_path,
                    from_stop_seq,
                    to_stop_seq,
                    departure_time,
                    arrival_time,
                    ..
                } => create_transit_feature(
                    network,
                    idx,
                    route_id,
                    trip_id,
                    *route_path,
                    (*from_stop_seq, *to_stop_seq),
                    (*departure_time, *arrival_time),
                ),
                JourneyLeg::Walk {
                    from_stop,
                    to_stop,
                    departure_time,
                    arrival_time,
                    duration,
                } => create_walk_feature(
                    network,
                    idx,
                    (*from_stop, *to_stop),
                    (*departure_time, *arrival_time),
                    *duration,
                ),
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self, network: &TransitNetwork) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson(network)?)
            .map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn create_transit_feature(
    network: &TransitNetwork,
    leg_idx: usize,
    route_id: &str,
    trip_id: &str,
    route_path: RoutePathIdx,
    (from_seq, to_seq): (usize, usize),
    (departure_time, arrival_time): (Time, Time),
) -> Result<Feature, Error> {
    let stops = network.route_path_stops(route_path);
    let from_stop = stops[from_seq];
    let to_stop = stops[to_seq];

    // Vehicle path through every intermediate stop
    let coords: Vec<Coord<f64>> = stops[from_seq..=to_seq]
        .iter()
        .map(|&stop| network.stop_location(stop).into())
        .collect();
    let geometry = Geometry::new(GeoJsonValue::from(&LineString::new(coords)));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "leg_type": "transit",
            "leg_index": leg_idx,
            "route_id": route_id,
            "trip_id": trip_id,
            "from_stop_id": network.stop(from_stop).stop_id,
            "to_stop_id": network.stop(to_stop).stop_id,
            "from_name": network.stop(from_stop).name,
            "to_name": network.stop(to_stop).name,
            "departure_time": departure_time,
            "arrival_time": arrival_time,
            "duration": arrival_time.saturating_sub(departure_time),
            "stops": to_seq - from_seq,
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn create_walk_feature(
    network: &TransitNetwork,
    leg_idx: usize,
    (from_stop, to_stop): (StopIdx, StopIdx),
    (departure_time, arrival_time): (Time, Time),
    duration: Time,
) -> Result<Feature, Error> {
    let geometry = create_direct_line_geometry(network, from_stop, to_stop);

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "leg_type": "walk",
            "leg_index": leg_idx,
            "from_stop_id": network.stop(from_stop).stop_id,
            "to_stop_id": network.stop(to_stop).stop_id,
            "from_name": network.stop(from_stop).name,
            "to_name": network.stop(to_stop).name,
            "departure_time": departure_time,
            "arrival_time": arrival_time,
            "duration": duration,
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn create_direct_line_geometry(
    network: &TransitNetwork,
    from_stop: StopIdx,
    to_stop: StopIdx,
) -> Geometry {
    let from_loc = network.stop_location(from_stop);
    let to_loc = network.stop_location(to_stop);
    let direct_line = line_string![
        (x: from_loc.x(), y: from_loc.y()),
        (x: to_loc.x(), y: to_loc.y())
    ];
    Geometry::new(GeoJsonValue::from(&direct_line))
}
