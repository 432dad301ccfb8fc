use crate::Point;

pub fn haversine_distance(fix1: &dyn Point, fix2: &dyn Point) -> f64 {
    const R: f64 = 6371.; // kilometers

    let phi1 = fix1.latitude().to_radians();
    let phi2 = fix2.latitude().to_radians();
    let delta_phi = (fix2.latitude() - fix1.latitude()).to_radians();
    let delta_rho = (fix2.longitude() - fix1.longitude()).to_radians();

    let a = (delta_phi / 2.).sin() * (delta_phi / 2.).sin() +
        phi1.cos() * phi2.cos() *
            (delta_rho / 2.).sin() * (delta_rho / 2.).sin();

    let c = 2. * a.sqrt().atan2((1. - a).sqrt());

    R * c
}

/// Sums the leg distances of a polyline in kilometers.
pub fn path_length<T: Point>(points: &[T]) -> f64 {
    points.iter().zip(points.iter().skip(1))
        .map(|(fix1, fix2)| haversine_distance(fix1, fix2))
        .sum()
}
