//! Small vector/rotation helpers shared by the solvers.
//!
//! All of these are total: degenerate inputs (zero-length or parallel
//! vectors) map to a defined result instead of NaN.

use nalgebra::{Quaternion, Unit, UnitQuaternion, Vector3};

/// Length below which a vector is treated as zero.
pub const EPSILON: f32 = 1e-6;

#[inline]
pub fn vec3(v: [f32; 3]) -> Vector3<f32> {
    Vector3::new(v[0], v[1], v[2])
}

/// Quaternion from `[x, y, z, w]` components. Zero or non-finite input
/// yields identity.
pub fn quat_xyzw(q: [f32; 4]) -> UnitQuaternion<f32> {
    if q.iter().any(|c| !c.is_finite()) {
        return UnitQuaternion::identity();
    }
    Unit::try_new(Quaternion::new(q[3], q[0], q[1], q[2]), EPSILON)
        .unwrap_or_else(UnitQuaternion::identity)
}

/// Some unit vector perpendicular to `v`. `v` may be zero, in which case +X
/// is returned.
pub fn any_orthogonal(v: &Vector3<f32>) -> Unit<Vector3<f32>> {
    // Cross with the basis axis least aligned with v.
    let a = v.abs();
    let basis = if a.x <= a.y && a.x <= a.z {
        Vector3::x()
    } else if a.y <= a.z {
        Vector3::y()
    } else {
        Vector3::z()
    };
    Unit::try_new(v.cross(&basis), EPSILON).unwrap_or_else(Vector3::x_axis)
}

/// Unsigned angle between two vectors in radians, `0` if either is zero.
pub fn angle_between(a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
    if a.norm_squared() <= EPSILON * EPSILON || b.norm_squared() <= EPSILON * EPSILON {
        return 0.0;
    }
    a.cross(b).norm().atan2(a.dot(b))
}

/// Shortest rotation taking the direction of `from` onto the direction of
/// `to`. Identity when either vector is zero; a half turn about an arbitrary
/// perpendicular axis when they are opposite.
pub fn shortest_arc(from: &Vector3<f32>, to: &Vector3<f32>) -> UnitQuaternion<f32> {
    match UnitQuaternion::rotation_between(from, to) {
        Some(q) => q,
        None => {
            log::trace!("shortest_arc: opposite directions, using orthogonal half turn");
            UnitQuaternion::from_axis_angle(&any_orthogonal(from), std::f32::consts::PI)
        }
    }
}

/// Shortest-path spherical interpolation. Falls back to normalized lerp when
/// the two rotations are too close for slerp to be well conditioned.
pub fn slerp_shortest(
    a: &UnitQuaternion<f32>,
    b: &UnitQuaternion<f32>,
    t: f32,
) -> UnitQuaternion<f32> {
    // try_slerp flips the sign of `b` itself when the dot product is negative.
    a.try_slerp(b, t, EPSILON).unwrap_or_else(|| {
        let b = if a.coords.dot(&b.coords) < 0.0 {
            Unit::new_unchecked(-b.into_inner())
        } else {
            *b
        };
        a.nlerp(&b, t)
    })
}

#[inline]
pub fn is_finite_vec(v: &Vector3<f32>) -> bool {
    v.iter().all(|c| c.is_finite())
}

#[inline]
pub fn is_finite_quat(q: &UnitQuaternion<f32>) -> bool {
    q.coords.iter().all(|c| c.is_finite())
}
