use crate::coordinates::Coordinate;
use crate::error::AppError;
use crate::metadata::Marker;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const MILES_PER_KM: f64 = 0.621371;

/// Great-circle distance in kilometres.
pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Miles for each consecutive pair, in sequence order.
pub fn leg_distances(markers: &[Marker]) -> Vec<f64> {
    markers
        .windows(2)
        .map(|pair| haversine_km(&pair[0].location, &pair[1].location) * MILES_PER_KM)
        .collect()
}

/// Path length in miles along the sequence as ordered.
pub fn total_distance(markers: &[Marker]) -> Result<f64, AppError> {
    if markers.len() < 2 {
        return Err(AppError::InsufficientData(markers.len()));
    }
    Ok(leg_distances(markers).iter().sum())
}

/// Mean position of the sequence; a centring hint for map renderers.
pub fn centroid(markers: &[Marker]) -> Option<Coordinate> {
    if markers.is_empty() {
        return None;
    }
    let n = markers.len() as f64;
    let latitude = markers.iter().map(|m| m.location.latitude).sum::<f64>() / n;
    let longitude = markers.iter().map(|m| m.location.longitude).sum::<f64>() / n;
    Some(Coordinate { latitude, longitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(label: &str, lat: f64, lon: f64) -> Marker {
        Marker::new(label, lat, lon).unwrap()
    }

    #[test]
    fn test_paris_to_london() {
        let path = vec![marker("Paris", 48.8566, 2.3522), marker("London", 51.5074, -0.1278)];
        let miles = total_distance(&path).unwrap();
        assert!((miles - 213.5).abs() < 0.5, "got {}", miles);
    }

    #[test]
    fn test_insufficient_data() {
        assert!(matches!(total_distance(&[]), Err(AppError::InsufficientData(0))));
        assert!(matches!(
            total_distance(&[marker("a", 1.0, 1.0)]),
            Err(AppError::InsufficientData(1))
        ));
    }

    #[test]
    fn test_path_sum_depends_on_order() {
        let a = marker("a", 0.0, 0.0);
        let b = marker("b", 0.0, 10.0);
        let c = marker("c", 0.0, 1.0);

        let abc = total_distance(&[a.clone(), b.clone(), c.clone()]).unwrap();
        let acb = total_distance(&[a, c, b]).unwrap();
        assert!(abc > acb);

        let legs = leg_distances(&[marker("x", 0.0, 0.0), marker("y", 0.0, 1.0), marker("z", 0.0, 2.0)]);
        assert_eq!(legs.len(), 2);
        assert!((legs[0] - legs[1]).abs() < 1e-9);
    }

    #[test]
    fn test_same_point_is_zero() {
        let p = Coordinate::new(12.0, 34.0).unwrap();
        assert_eq!(haversine_km(&p, &p), 0.0);
    }

    #[test]
    fn test_centroid() {
        assert!(centroid(&[]).is_none());
        let c = centroid(&[marker("a", 10.0, 20.0), marker("b", 20.0, 40.0)]).unwrap();
        assert_eq!(c.latitude, 15.0);
        assert_eq!(c.longitude, 30.0);
    }
}
