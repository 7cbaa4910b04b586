//! Pairwise safety metrics between the aggressor and the target
//!
//! Both functions are pure: they only read the two snapshots.

use crate::models::VehicleKinematics;

/// Nominal vehicle length used for bumper-to-bumper gaps (m)
pub const VEHICLE_LENGTH: f64 = 5.0;

const HALF_LENGTH: f64 = VEHICLE_LENGTH / 2.0;

/// Longitudinal time-to-collision between aggressor `bv` and target `av` (s)
///
/// Speeds are projected onto the road axis (`|speed * cos(heading)|`). When
/// both vehicles report the same lane the gap is bumper to bumper; otherwise
/// it is the raw longitudinal distance, so the measure stays a conservative
/// longitudinal-only hazard indicator even across lanes.
///
/// Returns `f64::INFINITY` when the gap is opening or the closing speed is
/// exactly zero.
///
/// # Example
/// ```
/// use cut_in_simulator_core_rs::VehicleKinematics;
/// use cut_in_simulator_core_rs::metrics::longitudinal_ttc;
///
/// // Aggressor 50 m behind in the same lane, closing at 5 m/s
/// let bv = VehicleKinematics::new(0.0, 4.0, 30.0, 0.0, 1.0);
/// let av = VehicleKinematics::new(50.0, 4.0, 25.0, 0.0, 1.0);
/// assert!((longitudinal_ttc(&bv, &av) - 9.0).abs() < 1e-9);
///
/// // Same speed: never collides
/// let av_same = VehicleKinematics::new(50.0, 4.0, 30.0, 0.0, 1.0);
/// assert!(longitudinal_ttc(&bv, &av_same).is_infinite());
/// ```
pub fn longitudinal_ttc(bv: &VehicleKinematics, av: &VehicleKinematics) -> f64 {
    let bv_x = bv.position_x;
    let av_x = av.position_x;
    let aggressor_ahead = bv_x > av_x;

    let gap = if bv.lane_index == av.lane_index {
        if aggressor_ahead {
            (bv_x - HALF_LENGTH) - (av_x + HALF_LENGTH)
        } else {
            (av_x - HALF_LENGTH) - (bv_x + HALF_LENGTH)
        }
    } else {
        (bv_x - av_x).abs()
    };

    let closing_speed = bv.longitudinal_speed() - av.longitudinal_speed();
    if closing_speed == 0.0 {
        return f64::INFINITY;
    }

    if aggressor_ahead {
        // Aggressor pulling away when faster
        if closing_speed > 0.0 {
            f64::INFINITY
        } else {
            gap / closing_speed.abs()
        }
    } else if closing_speed < 0.0 {
        f64::INFINITY
    } else {
        gap / closing_speed
    }
}

/// Euclidean distance between the two vehicle reference points (m)
pub fn separation(bv: &VehicleKinematics, av: &VehicleKinematics) -> f64 {
    (bv.position_x - av.position_x).hypot(bv.position_y - av.position_y)
}
