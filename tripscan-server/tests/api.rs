use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use tripscan::TransitModel;
use tripscan_core::prelude::*;
use tripscan_server::{AppState, Config, create_router};

fn hms(hours: Time, minutes: Time) -> Time {
    hours * 3600 + minutes * 60
}

/// R1 A -> B -> C at 08:00 and 08:30, R2 C -> D at 08:20 and 09:00
fn model() -> TransitModel {
    let config = NetworkConfig {
        generate_footpaths: false,
        ..NetworkConfig::default()
    };
    let mut builder = NetworkBuilder::new(config);
    for (index, stop) in ["A", "B", "C", "D"].into_iter().enumerate() {
        builder.add_stop(StopInput::new(stop, 59.3, 18.0 + index as f64 * 0.02).with_name(stop));
    }
    builder
        .add_route(RouteInput::new("R1"))
        .add_route(RouteInput::new("R2"));
    for start in [hms(8, 0), hms(8, 30)] {
        builder.add_trip(TripInput::new(
            format!("R1-{start}"),
            "R1",
            vec![
                StopTimeInput::new("A", start, start),
                StopTimeInput::new("B", start + 300, start + 300),
                StopTimeInput::new("C", start + 600, start + 600),
            ],
        ));
    }
    for start in [hms(8, 20), hms(9, 0)] {
        builder.add_trip(TripInput::new(
            format!("R2-{start}"),
            "R2",
            vec![
                StopTimeInput::new("C", start, start),
                StopTimeInput::new("D", start + 600, start + 600),
            ],
        ));
    }
    TransitModel::from_network(builder.build().unwrap())
}

fn app_with(config: &Config) -> Router {
    create_router(Arc::new(AppState::new(model(), config)))
}

fn app() -> Router {
    app_with(&Config::default())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn single_target_route() {
    let (status, body) = get(
        app(),
        "/route/v1/transit?origin_stop_id=A&destination_stop_id=D&weekday=0&time=07:55&min_waiting_time=0",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["origin"], "A");
    let stop = &body["stops"][0];
    assert_eq!(stop["stopId"], "D");
    assert_eq!(stop["reachable"], true);
    assert_eq!(stop["arrivalTimeSeconds"], hms(8, 30));
    assert_eq!(stop["travelTimeSeconds"], 35 * 60);
    assert_eq!(stop["numberOfTransfers"], 1);
    assert_eq!(stop["pareto"], json!([{"numberOfTransfers": 1, "arrivalTimeSeconds": hms(8, 30)}]));
    assert!(stop.get("journey").is_none());
    assert!(body["calculatedInMilliseconds"].is_number());
}

#[tokio::test]
async fn default_waiting_time_applies() {
    // 300 s buffer after 07:58 misses the 08:00 departure
    let (status, body) = get(
        app(),
        "/route/v1/transit?origin_stop_id=A&destination_stop_id=C&weekday=0&departure_time=07:58:00",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stops"][0]["arrivalTimeSeconds"], hms(8, 40));
}

#[tokio::test]
async fn detailed_route_has_journey_legs() {
    let (status, body) = get(
        app(),
        "/route/v1/transit?origin_stop_id=A&destination_stop_id=D&date=2024-06-03&time=07:55&min_waiting_time=0&detailed=true",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let journey = &body["stops"][0]["journey"];
    let legs = journey["legs"].as_array().unwrap();
    let transit: Vec<_> = legs.iter().filter(|leg| leg["type"] == "transit").collect();
    assert_eq!(transit.len(), 2);
    assert_eq!(transit[0]["routeId"], "R1");
    assert_eq!(transit[0]["fromStopId"], "A");
    assert_eq!(transit[1]["routeId"], "R2");
    assert_eq!(transit[1]["toStopId"], "D");
    assert_eq!(journey["numberOfTransfers"], 1);
    assert_eq!(journey["geojson"]["type"], "FeatureCollection");
}

#[tokio::test]
async fn all_stops_route() {
    let (status, body) = get(
        app(),
        "/route/v1/transit?origin_stop_id=A&all_stops=true&weekday=0&time=07:55&min_waiting_time=0",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let stops = body["stops"].as_array().unwrap();
    assert_eq!(stops.len(), 4);
    assert_eq!(body["reachableCount"], 3);
    let origin = stops.iter().find(|stop| stop["stopId"] == "A").unwrap();
    assert_eq!(origin["reachable"], false);
    assert_eq!(origin["arrivalTimeSeconds"], Value::Null);
}

#[tokio::test]
async fn unknown_stop_is_bad_request() {
    let (status, body) = get(
        app(),
        "/route/v1/transit?origin_stop_id=A&destination_stop_id=Z&weekday=0&time=08:00",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "failed");
    assert!(body["error"].as_str().unwrap().contains('Z'));
}

#[tokio::test]
async fn invalid_parameters_are_bad_requests() {
    for uri in [
        "/route/v1/transit?destination_stop_id=D&weekday=0&time=08:00",
        "/route/v1/transit?origin_stop_id=A&destination_stop_id=D&weekday=9&time=08:00",
        "/route/v1/transit?origin_stop_id=A&destination_stop_id=D&weekday=0&time=50:00",
        "/route/v1/transit?origin_stop_id=A&destination_stop_id=D&date=03-06-2024&time=08:00",
    ] {
        let (status, body) = get(app(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["status"], "failed", "{uri}");
    }
}

#[tokio::test]
async fn limits_restrict_queries() {
    let mut config = Config::default();
    config.limits.allow_all_stops = false;
    config.limits.max_transfers_cap = 0;

    let (status, _) = get(
        app_with(&config),
        "/route/v1/transit?origin_stop_id=A&all_stops=true&weekday=0&time=07:55",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(
        app_with(&config),
        "/route/v1/transit?origin_stop_id=A&destination_stop_id=D&weekday=0&time=07:55&min_waiting_time=0&max_transfers=3",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stops"][0]["reachable"], false);
}

#[tokio::test]
async fn od_replay_tallies_boardings() {
    let request = json!({
        "trips": [
            {"id": "a", "origin_stop_id": "A", "destination_stop_id": "D",
             "departure_time": "07:55:00", "weekday": 0, "expansion_factor": 1.5},
            {"id": "b", "origin_stop_id": "A", "destination_stop_id": "C",
             "departure_time": hms(7, 55), "weekday": 0},
            {"id": "c", "origin_stop_id": "Q", "destination_stop_id": "C",
             "departure_time": hms(7, 55), "weekday": 0}
        ],
        "options": {"period_length": 1800}
    });
    let (status, body) = send(
        app(),
        Request::post("/od_trips/v1/replay")
            .header("content-type", "application/json")
            .body(Body::from(request.to_string()))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let profile = &body["profile"];
    assert_eq!(profile["reachable"], 2);
    assert_eq!(profile["failed"], 1);
    assert_eq!(profile["period_length"], 1800);
    let trips = profile["trips"].as_array().unwrap();
    assert_eq!(trips[0]["trip_id"], format!("R1-{}", hms(8, 0)));
    assert_eq!(trips[0]["boardings"], 2);
    assert_eq!(trips[0]["weight"], 2.5);
}

#[tokio::test]
async fn malformed_replay_body_is_bad_request() {
    let (status, body) = send(
        app(),
        Request::post("/od_trips/v1/replay")
            .header("content-type", "application/json")
            .body(Body::from("{\"trips\": 3}"))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "failed");
}

#[tokio::test]
async fn health_reports_network_size() {
    let (status, body) = get(app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["stops"], 4);
    assert_eq!(body["routes"], 2);
    assert_eq!(body["trips"], 4);
    assert_eq!(body["feeds"], json!([]));
}

#[tokio::test]
async fn travel_time_limit_and_route_filters() {
    let base = "/route/v1/transit?origin_stop_id=A&destination_stop_id=D&weekday=0&time=07:55&min_waiting_time=0";

    let (status, body) = get(app(), &format!("{base}&max_travel_time_minutes=35")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stops"][0]["arrivalTimeSeconds"], hms(8, 30));

    let (status, body) = get(app(), &format!("{base}&max_travel_time=2099")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stops"][0]["reachable"], false);
    assert_eq!(body["reachableCount"], 0);

    let (status, body) = get(app(), &format!("{base}&except_route_ids=R2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stops"][0]["reachable"], false);

    let (status, body) = get(app(), &format!("{base}&only_route_ids=R1,R2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stops"][0]["reachable"], true);

    let (status, body) = get(app(), &format!("{base}&only_route_ids=R7")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "failed");
}
