use crate::models::Coordinate;

/// Latitude/longitude of the Kaaba in Makkah.
pub const KAABA: (f64, f64) = (21.4225, 39.8262);

/// Initial great-circle bearing from `observer` to the Kaaba, in [0, 360).
///
/// Undefined at the poles; callers are not guarded against that.
pub fn qibla_bearing(observer: &Coordinate) -> f64 {
    let (target_lat, target_lng) = KAABA;

    let phi_obs = observer.latitude.to_radians();
    let phi_target = target_lat.to_radians();
    let delta_lambda = (target_lng - observer.longitude).to_radians();

    let y = delta_lambda.sin();
    let x = phi_obs.cos() * phi_target.tan() - phi_obs.sin() * delta_lambda.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// How far to rotate from `heading` to face `bearing`, clockwise, in [0, 360).
pub fn relative_turn(bearing: f64, heading: f64) -> f64 {
    normalize_degrees(bearing - heading)
}

fn normalize_degrees(deg: f64) -> f64 {
    let n = (deg + 360.0) % 360.0;
    // `%` keeps the sign of the dividend, so very negative inputs need a second pass
    if n < 0.0 { n + 360.0 } else { n }
}

/// Eight-point compass label for a bearing.
pub fn compass_point(bearing: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let idx = ((normalize_degrees(bearing) + 22.5) / 45.0) as usize % 8;
    POINTS[idx]
}
