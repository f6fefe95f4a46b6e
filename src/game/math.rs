//! Vector and circle collision helpers

/// Below this centre distance two circles are treated as coincident and
/// have no usable contact normal.
pub const MIN_NORMAL_DISTANCE: f32 = 1e-4;

/// Euclidean distance between two points
pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

/// Angle in radians of the vector pointing from (x1, y1) to (x2, y2)
pub fn angle_between(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    (y2 - y1).atan2(x2 - x1)
}

/// Result of a circle-circle contact test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the first circle towards the second
    pub nx: f32,
    pub ny: f32,
    /// Penetration depth (positive when overlapping)
    pub overlap: f32,
}

/// Compute the contact between two circles.
///
/// Returns `None` when they do not overlap, and also when the centres
/// coincide: no normal exists, so the caller skips the response this tick.
pub fn circle_contact(x1: f32, y1: f32, r1: f32, x2: f32, y2: f32, r2: f32) -> Option<Contact> {
    let dist = distance(x1, y1, x2, y2);
    let overlap = r1 + r2 - dist;

    if overlap <= 0.0 || dist < MIN_NORMAL_DISTANCE || !dist.is_finite() {
        return None;
    }

    Some(Contact {
        nx: (x2 - x1) / dist,
        ny: (y2 - y1) / dist,
        overlap,
    })
}

/// Split an overlap between two circles, pushing each half-way apart.
/// Returns ((new_x1, new_y1), (new_x2, new_y2)).
pub fn separate_equally(
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    contact: &Contact,
) -> ((f32, f32), (f32, f32)) {
    let push = contact.overlap / 2.0;
    (
        (x1 - contact.nx * push, y1 - contact.ny * push),
        (x2 + contact.nx * push, y2 + contact.ny * push),
    )
}

/// Point on the surface of a circle of `radius` around (cx, cy), in the
/// contact normal direction. Used to push a circle fully clear of another.
pub fn push_clear(cx: f32, cy: f32, radius: f32, contact: &Contact) -> (f32, f32) {
    (cx + contact.nx * radius, cy + contact.ny * radius)
}

/// Mix two horizontal velocities: each body keeps `1 - fraction` of its own
/// velocity and takes `fraction` of the other's.
pub fn mix_velocities(v1: f32, v2: f32, fraction: f32) -> (f32, f32) {
    (v1 + (v2 - v1) * fraction, v2 + (v1 - v2) * fraction)
}

#[inline]
pub fn deg_to_rad(deg: f32) -> f32 {
    deg.to_radians()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_and_angle() {
        assert!((distance(0.0, 0.0, 3.0, 4.0) - 5.0).abs() < 1e-6);
        assert!((angle_between(0.0, 0.0, 0.0, 1.0) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!(angle_between(0.0, 0.0, 1.0, 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_contact_overlap() {
        let contact = circle_contact(0.0, 0.0, 30.0, 50.0, 0.0, 30.0).unwrap();
        assert!((contact.nx - 1.0).abs() < 1e-6);
        assert!(contact.ny.abs() < 1e-6);
        assert!((contact.overlap - 10.0).abs() < 1e-4);

        assert!(circle_contact(0.0, 0.0, 30.0, 61.0, 0.0, 30.0).is_none());
    }

    #[test]
    fn test_coincident_centres_have_no_contact() {
        assert!(circle_contact(10.0, 10.0, 30.0, 10.0, 10.0, 30.0).is_none());
    }

    #[test]
    fn test_separate_equally_resolves_overlap() {
        let contact = circle_contact(100.0, 200.0, 30.0, 140.0, 200.0, 30.0).unwrap();
        let ((x1, y1), (x2, y2)) = separate_equally(100.0, 200.0, 140.0, 200.0, &contact);
        assert!((x1 - 90.0).abs() < 1e-4);
        assert!((x2 - 150.0).abs() < 1e-4);
        assert_eq!(y1, 200.0);
        assert_eq!(y2, 200.0);
        assert!((distance(x1, y1, x2, y2) - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_mix_velocities_conserves_sum() {
        let (a, b) = mix_velocities(6.0, -2.0, 0.25);
        assert!((a - 4.0).abs() < 1e-6);
        assert!((b - 0.0).abs() < 1e-6);
        assert!((a + b - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_degree_conversion() {
        assert!((deg_to_rad(180.0) - std::f32::consts::PI).abs() < 1e-6);
        assert!((deg_to_rad(45.0) - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    }
}
