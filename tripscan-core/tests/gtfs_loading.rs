use std::fs;
use std::path::Path;

use tripscan_core::prelude::*;

fn write_feed(dir: &Path) {
    let files = [
        (
            "stops.txt",
            "stop_id,stop_name,stop_lat,stop_lon\n\
             S1,Central,55.7500,37.6000\n\
             S2,Market,55.7600,37.6100\n\
             S3,Harbour,55.7700,37.6200\n\
             S4,Harbour East,55.7701,37.6202\n\
             S5,Depot,55.7800,37.6300\n\
             BAD,Broken,not-a-number,37.0\n",
        ),
        (
            "routes.txt",
            "route_id,route_short_name,route_long_name,route_type\n\
             R1,1,Central - Harbour,3\n\
             R2,2,Harbour East - Depot,3\n",
        ),
        (
            "trips.txt",
            "route_id,service_id,trip_id\n\
             R1,WK,T1\n\
             R2,WK,T2\n\
             R2,WE,T3\n\
             R1,UNKNOWN,T4\n",
        ),
        (
            "stop_times.txt",
            "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
             T1,08:00:00,08:00:00,S1,1\n\
             T1,08:10:00,08:11:00,S2,2\n\
             T1,08:20:00,08:20:00,S3,3\n\
             T2,08:30:00,08:30:00,S4,1\n\
             T2,08:45:00,08:45:00,S5,2\n\
             T3,09:30:00,09:30:00,S4,1\n\
             T3,09:45:00,09:45:00,S5,2\n\
             T4,10:00:00,10:00:00,S1,1\n\
             T4,10:10:00,10:10:00,S2,2\n",
        ),
        (
            "calendar.txt",
            "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
             WK,1,1,1,1,1,0,0,20240101,20241231\n\
             WE,0,0,0,0,0,1,1,20240101,20241231\n",
        ),
        (
            "transfers.txt",
            "from_stop_id,to_stop_id,transfer_type,min_transfer_time\n\
             S3,S4,2,180\n\
             S4,S3,2,180\n\
             S1,S2,0,\n",
        ),
        (
            "feed_info.txt",
            "feed_publisher_name,feed_publisher_url,feed_lang,feed_start_date,feed_end_date,feed_version\n\
             City Transit,https://transit.example,en,20240101,20241231,2024.1\n",
        ),
    ];
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
}

fn config(dir: &Path) -> NetworkConfig {
    NetworkConfig {
        generate_footpaths: false,
        ..NetworkConfig::with_gtfs_dirs([dir])
    }
}

#[test]
fn loads_feed_and_answers_queries() {
    let dir = tempfile::tempdir().unwrap();
    write_feed(dir.path());

    let network = create_transit_network(&config(dir.path())).unwrap();

    assert_eq!(network.stop_count(), 5);
    assert_eq!(network.route_count(), 2);
    // T4 has no calendar entry
    assert_eq!(network.trip_count(), 3);
    assert_eq!(network.stop(network.stop_index("S2").unwrap()).name, "Market");
    assert_eq!(network.feeds_info().len(), 1);
    assert_eq!(network.feeds_info()[0].publisher_name, "City Transit");

    let calculator = Calculator::new(&network);
    let query = Query::between("S1", "S5", 0, 7 * 3600 + 50 * 60).detailed(true);
    let result = calculator.calculate(&query).unwrap();
    let reached = result.stops[0].reached.as_ref().unwrap();

    assert_eq!(reached.arrival_time, 8 * 3600 + 45 * 60);
    assert_eq!(reached.transfers, 1);
    let journey = reached.journey.as_ref().unwrap();
    assert!(journey.legs.iter().any(|leg| matches!(
        leg,
        JourneyLeg::Walk { duration: 180, .. }
    )));
}

#[test]
fn weekend_service_is_separate() {
    let dir = tempfile::tempdir().unwrap();
    write_feed(dir.path());
    let network = create_transit_network(&config(dir.path())).unwrap();

    assert_eq!(network.timetable(0).unwrap().trip_count(), 2);
    assert_eq!(network.timetable(6).unwrap().trip_count(), 1);

    let calculator = Calculator::new(&network);
    let sunday = Query::between("S4", "S5", 6, 9 * 3600);
    let result = calculator.calculate(&sunday).unwrap();
    assert_eq!(result.stops[0].arrival_time(), Some(9 * 3600 + 45 * 60));
}

#[test]
fn generated_footpaths_connect_close_stops() {
    let dir = tempfile::tempdir().unwrap();
    write_feed(dir.path());
    fs::remove_file(dir.path().join("transfers.txt")).unwrap();

    let mut config = config(dir.path());
    config.generate_footpaths = true;
    config.max_footpath_time = 300;
    let network = create_transit_network(&config).unwrap();

    let harbour = network.stop_index("S3").unwrap();
    let harbour_east = network.stop_index("S4").unwrap();
    let walk = network.footpath_duration(harbour, harbour_east).unwrap();
    assert!(walk > 0 && walk < 60);
    assert_eq!(network.footpath_duration(harbour, network.stop_index("S1").unwrap()), None);
}

#[test]
fn missing_directory_is_reported() {
    let config = NetworkConfig::with_gtfs_dirs(["/definitely/not/here"]);
    assert!(matches!(
        create_transit_network(&config),
        Err(Error::IoError(_))
    ));
}

#[test]
fn missing_required_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_feed(dir.path());
    fs::remove_file(dir.path().join("stop_times.txt")).unwrap();

    assert!(matches!(
        create_transit_network(&config(dir.path())),
        Err(Error::IoError(_))
    ));
}

#[test]
fn empty_configuration_is_rejected() {
    assert!(matches!(
        create_transit_network(&NetworkConfig::default()),
        Err(Error::InvalidData(_))
    ));
}
