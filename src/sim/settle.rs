//! Settling detector
//!
//! Decides which dice have come to rest, reads their top faces once, and
//! relaunches any die that fell out of the tray.

use rand::Rng;

use super::physics::PhysicsWorld;
use super::spawn::{launch, respawn_position};
use super::state::{DieInstance, DieStatus, Outcome};
use crate::dice::DieLibrary;
use crate::settings::DetectionSettings;

/// Rest and out-of-bounds limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleThresholds {
    pub linear: f32,
    pub angular: f32,
    pub floor_y: f32,
}

impl Default for SettleThresholds {
    fn default() -> Self {
        Self::from(&DetectionSettings::default())
    }
}

impl From<&DetectionSettings> for SettleThresholds {
    fn from(s: &DetectionSettings) -> Self {
        Self {
            linear: s.linear_epsilon,
            angular: s.angular_epsilon,
            floor_y: s.floor_y,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettleReport {
    /// Spawn order, `None` for dice still moving
    pub results: Vec<Option<Outcome>>,
    pub all_settled: bool,
    /// Dice relaunched this pass
    pub respawned: usize,
}

/// One detection pass over every die.
///
/// A die below the floor threshold is relaunched and goes back to pending,
/// whatever its status. A settled die keeps its outcome. Otherwise a die
/// whose speeds are both at or under the thresholds settles now, and its top
/// face is resolved exactly once.
pub fn detect_state(
    dice: &mut [DieInstance],
    physics: &mut PhysicsWorld,
    library: &DieLibrary,
    thresholds: &SettleThresholds,
    rng: &mut impl Rng,
) -> SettleReport {
    let mut report = SettleReport {
        results: Vec::with_capacity(dice.len()),
        all_settled: true,
        respawned: 0,
    };

    for die in dice.iter_mut() {
        let result = match physics.pose(die.body) {
            None => None,
            Some(pose) if pose.position.y < thresholds.floor_y => {
                let position = respawn_position(rng);
                physics.relaunch(die.body, position, &launch(rng));
                log::debug!(
                    "{} fell out at {:?}, relaunched from {:?}",
                    die.kind,
                    pose.position,
                    position
                );
                die.status = DieStatus::Pending;
                report.respawned += 1;
                None
            }
            Some(pose) => match die.status {
                DieStatus::Settled(outcome) => Some(outcome),
                DieStatus::Pending => {
                    let (linear, angular) = physics.speeds(die.body).unwrap_or((0.0, 0.0));
                    if linear > thresholds.linear || angular > thresholds.angular {
                        None
                    } else {
                        let desc = library.get(die.kind);
                        let face = desc.resolve_top_face(pose.rotation, rng);
                        let outcome = Outcome {
                            value: desc.value_for(face),
                            kind: die.kind,
                            position: pose.position,
                        };
                        die.status = DieStatus::Settled(outcome);
                        Some(outcome)
                    }
                }
            },
        };
        report.all_settled &= result.is_some();
        report.results.push(result);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::DieType;
    use crate::notation::DiceCounts;
    use crate::settings::TraySettings;
    use crate::sim::physics::Launch;
    use crate::sim::spawn::spawn;
    use crate::sim::state::DiceTray;
    use glam::{Quat, Vec3};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn still(rotation: Quat) -> Launch {
        Launch {
            rotation,
            linvel: Vec3::ZERO,
            angvel: Vec3::ZERO,
        }
    }

    fn tray_with(counts: DiceCounts) -> DiceTray {
        let mut tray = DiceTray::new(TraySettings::default(), 3).unwrap();
        spawn(&mut tray, &counts, 11).unwrap();
        tray
    }

    fn detect(tray: &mut DiceTray, rng: &mut Pcg32) -> SettleReport {
        detect_state(
            &mut tray.dice,
            &mut tray.physics,
            &tray.library,
            &SettleThresholds::default(),
            rng,
        )
    }

    #[test]
    fn test_moving_dice_stay_pending() {
        let mut tray = tray_with(DiceCounts::new().with(DieType::D6, 3));
        let mut rng = Pcg32::seed_from_u64(0);
        let report = detect(&mut tray, &mut rng);
        assert_eq!(report.results, vec![None; 3]);
        assert!(!report.all_settled);
    }

    #[test]
    fn test_resting_die_reads_top_face() {
        let mut tray = tray_with(DiceCounts::new().with(DieType::D6, 1));
        let body = tray.dice[0].body;
        tray.physics
            .relaunch(body, Vec3::new(0.0, 0.5, 0.0), &still(Quat::IDENTITY));
        let mut rng = Pcg32::seed_from_u64(0);
        let report = detect(&mut tray, &mut rng);
        assert!(report.all_settled);
        let outcome = report.results[0].unwrap();
        assert_eq!(outcome.kind, DieType::D6);
        let expected = tray.library.get(DieType::D6);
        let face = expected.resolve_top_face(Quat::IDENTITY, &mut rng);
        assert_eq!(outcome.value, expected.value_for(face));
        assert_eq!(outcome.position, Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_settled_outcome_is_frozen() {
        let mut tray = tray_with(DiceCounts::new().with(DieType::D20, 1));
        let body = tray.dice[0].body;
        tray.physics
            .relaunch(body, Vec3::new(1.0, 1.0, 1.0), &still(Quat::IDENTITY));
        let mut rng = Pcg32::seed_from_u64(0);
        let first = detect(&mut tray, &mut rng).results[0].unwrap();

        // Knocked over after landing: the reading does not change
        let tipped = Quat::from_rotation_x(2.0);
        let kick = Launch {
            rotation: tipped,
            linvel: Vec3::new(3.0, 0.0, 0.0),
            angvel: Vec3::new(0.0, 4.0, 0.0),
        };
        tray.physics.relaunch(body, Vec3::new(2.0, 1.0, 1.0), &kick);
        let again = detect(&mut tray, &mut rng);
        assert_eq!(again.results[0], Some(first));
        assert!(again.all_settled);
    }

    #[test]
    fn test_fallen_die_is_relaunched() {
        let mut tray = tray_with(DiceCounts::new().with(DieType::D8, 2));
        let mut rng = Pcg32::seed_from_u64(0);
        for die in &tray.dice {
            tray.physics
                .relaunch(die.body, Vec3::new(0.0, 0.4, 0.0), &still(Quat::IDENTITY));
        }
        assert!(detect(&mut tray, &mut rng).all_settled);

        let lost = tray.dice[1].body;
        tray.physics
            .relaunch(lost, Vec3::new(50.0, -12.0, 0.0), &still(Quat::IDENTITY));
        let report = detect(&mut tray, &mut rng);
        assert_eq!(report.respawned, 1);
        assert!(report.results[0].is_some());
        assert_eq!(report.results[1], None);
        assert!(!report.all_settled);
        assert_eq!(tray.dice[1].status, DieStatus::Pending);

        let pose = tray.physics.pose(lost).unwrap();
        assert!(pose.position.y >= 6.0 && pose.position.y <= 9.0);
        assert!(pose.position.x.abs() <= 2.5 && pose.position.z.abs() <= 2.5);
        let (linear, angular) = tray.physics.speeds(lost).unwrap();
        assert!(linear > 0.05 && angular > 0.05);
    }

    #[test]
    fn test_d10_ambiguity_resolved_once() {
        let mut tray = tray_with(DiceCounts::new().with(DieType::D10, 1));
        let body = tray.dice[0].body;
        // Tipped onto its side
        let sideways = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);
        tray.physics
            .relaunch(body, Vec3::new(0.0, 1.0, 0.0), &still(sideways));
        let mut rng = Pcg32::seed_from_u64(5);
        let first = detect(&mut tray, &mut rng).results[0].unwrap();
        for _ in 0..20 {
            assert_eq!(detect(&mut tray, &mut rng).results[0], Some(first));
        }
    }

    #[test]
    fn test_thousand_resting_dice_settle_in_one_pass() {
        let mut tray = tray_with(DiceCounts::new().with(DieType::D6, 1000));
        for die in &tray.dice {
            let position = die.pose.position.with_y(0.5);
            tray.physics
                .relaunch(die.body, position, &still(Quat::IDENTITY));
        }
        let mut rng = Pcg32::seed_from_u64(0);
        let report = detect(&mut tray, &mut rng);
        assert!(report.all_settled);
        assert_eq!(report.results.len(), 1000);
        assert!(report.results.iter().all(Option::is_some));

        let up = tray.library.get(DieType::D6);
        let value = up.value_for(up.resolve_top_face(Quat::IDENTITY, &mut rng));
        let luck = crate::luck::LuckTracker::new().update(&report.results, 0);
        assert_eq!(luck.total, 1000 * i64::from(value));
        assert_eq!(luck.landed, 1000);
        let beats = luck.beats.unwrap();
        assert!((0.0..=100.0).contains(&beats));
    }

    #[test]
    fn test_empty_tray_is_settled() {
        let library = DieLibrary::build().unwrap();
        let mut physics =
            PhysicsWorld::new(&Default::default(), &library, crate::consts::SIM_DT).unwrap();
        let mut rng = Pcg32::seed_from_u64(0);
        let report = detect_state(
            &mut [],
            &mut physics,
            &library,
            &SettleThresholds::default(),
            &mut rng,
        );
        assert!(report.all_settled);
        assert!(report.results.is_empty());
    }
}
