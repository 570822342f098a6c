//! Tests for GrappleRig (fire/release/reel/late tick).

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::config::GameplayConfig;
    use crate::grapple::{
        BodyPose, FireOutcome, GrappleRig, Hand, ReelMode, StaticBox, StaticWorld, TetherSet,
    };

    /// Стена, передняя грань ровно на z
    fn wall_at_z(z: f32) -> StaticWorld {
        StaticWorld::default().with_box(StaticBox::from_center(
            Vec3::new(0.0, 0.0, z + 0.5),
            Vec3::new(20.0, 20.0, 0.5),
        ))
    }

    /// Rig с origin в центре тела, range 50, floor 2
    fn centered_rig(mode: ReelMode) -> GrappleRig {
        let mut config = GameplayConfig::default();
        config.reel.default_mode = mode;
        let mut rig = GrappleRig::from_config(&config).with_origin_offsets(Vec3::ZERO, Vec3::ZERO);
        rig.set_aim_direction(Vec3::Z);
        rig
    }

    #[test]
    fn test_fire_hits_wall_in_range() {
        let world = wall_at_z(10.0);
        let mut tethers = TetherSet::default();
        let mut rig = centered_rig(ReelMode::Manual);

        let outcome = rig.fire(Hand::Left, &BodyPose::at(Vec3::ZERO), &world, &mut tethers);

        assert!(matches!(outcome, FireOutcome::Attached { .. }));
        assert!(rig.is_attached(Hand::Left));
        assert!(!rig.is_attached(Hand::Right));

        let anchor = rig.anchor_point(Hand::Left).unwrap();
        assert!((anchor - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-4);
        assert!((rig.wire(Hand::Left).unwrap().max_length() - 10.0).abs() < 1e-4);
        assert_eq!(tethers.len(), 1);
    }

    #[test]
    fn test_fire_beyond_range_stays_detached() {
        let world = wall_at_z(60.0);
        let mut tethers = TetherSet::default();
        let mut rig = centered_rig(ReelMode::Manual);

        let outcome = rig.fire(Hand::Right, &BodyPose::at(Vec3::ZERO), &world, &mut tethers);

        assert_eq!(outcome, FireOutcome::NoTarget);
        assert!(!rig.is_any_attached());
        assert!(tethers.is_empty());
    }

    #[test]
    fn test_fire_into_attached_slot_keeps_anchor() {
        let mut tethers = TetherSet::default();
        let mut rig = centered_rig(ReelMode::Manual);
        rig.fire(Hand::Left, &BodyPose::at(Vec3::ZERO), &wall_at_z(10.0), &mut tethers);

        // Другая стена, другой прицел - слот занят, ничего не меняется
        rig.set_aim_direction(Vec3::new(0.0, 0.3, 1.0));
        let outcome = rig.fire(Hand::Left, &BodyPose::at(Vec3::ZERO), &wall_at_z(5.0), &mut tethers);

        assert_eq!(outcome, FireOutcome::AlreadyAttached);
        let anchor = rig.anchor_point(Hand::Left).unwrap();
        assert!((anchor.z - 10.0).abs() < 1e-4);
        assert_eq!(tethers.len(), 1);
    }

    #[test]
    fn test_release_detached_is_noop() {
        let mut tethers = TetherSet::default();
        let mut rig = centered_rig(ReelMode::Manual);

        assert!(!rig.release(Hand::Left, &mut tethers));
        assert!(!rig.release(Hand::Left, &mut tethers));
        assert!(!rig.is_any_attached());
    }

    #[test]
    fn test_release_destroys_joint() {
        let mut tethers = TetherSet::default();
        let mut rig = centered_rig(ReelMode::Manual);
        rig.fire(Hand::Left, &BodyPose::at(Vec3::ZERO), &wall_at_z(10.0), &mut tethers);

        assert!(rig.release(Hand::Left, &mut tethers));
        assert!(rig.anchor_point(Hand::Left).is_none());
        assert!(tethers.is_empty());
    }

    #[test]
    fn test_release_all_clears_both_hands() {
        let world = wall_at_z(10.0);
        let mut tethers = TetherSet::default();
        let mut rig = centered_rig(ReelMode::Manual);
        rig.fire(Hand::Left, &BodyPose::at(Vec3::ZERO), &world, &mut tethers);
        rig.fire(Hand::Right, &BodyPose::at(Vec3::ZERO), &world, &mut tethers);
        assert_eq!(tethers.len(), 2);

        rig.release_all(&mut tethers);

        assert!(!rig.is_any_attached());
        assert!(tethers.is_empty());
    }

    #[test]
    fn test_manual_reel_two_ticks_clamps_at_floor() {
        let mut tethers = TetherSet::default();
        let mut rig = centered_rig(ReelMode::Manual);
        rig.fire(Hand::Left, &BodyPose::at(Vec3::ZERO), &wall_at_z(10.0), &mut tethers);
        rig.set_manual_reel(true);

        rig.tick(1.0, Vec3::ZERO, Vec3::ZERO, &mut tethers);
        let after_one = rig.wire(Hand::Left).unwrap().max_length();
        assert!((after_one - 5.0).abs() < 1e-4);

        rig.tick(1.0, Vec3::ZERO, Vec3::ZERO, &mut tethers);
        assert_eq!(rig.wire(Hand::Left).unwrap().max_length(), 2.0);

        let joint = rig.wire(Hand::Left).unwrap().joint().unwrap();
        assert_eq!(tethers.get(joint).unwrap().max_distance, 2.0);
    }

    #[test]
    fn test_manual_mode_without_button_does_nothing() {
        let mut tethers = TetherSet::default();
        let mut rig = centered_rig(ReelMode::Manual);
        rig.fire(Hand::Left, &BodyPose::at(Vec3::ZERO), &wall_at_z(10.0), &mut tethers);

        assert_eq!(rig.active_reel_policy(), None);
        rig.tick(1.0, Vec3::Z * 3.0, Vec3::ZERO, &mut tethers);
        assert!((rig.wire(Hand::Left).unwrap().max_length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_auto_reel_lengthens_when_receding() {
        let mut tethers = TetherSet::default();
        let mut rig = centered_rig(ReelMode::Auto);
        rig.fire(Hand::Left, &BodyPose::at(Vec3::ZERO), &wall_at_z(10.0), &mut tethers);

        // base 3, toward -5 → 10 - (3 - 5) = 12
        rig.tick(1.0, Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, &mut tethers);
        assert!((rig.wire(Hand::Left).unwrap().max_length() - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_manual_suppresses_auto() {
        let mut tethers = TetherSet::default();
        let mut rig = centered_rig(ReelMode::Auto);
        rig.fire(Hand::Left, &BodyPose::at(Vec3::ZERO), &wall_at_z(10.0), &mut tethers);
        rig.set_manual_reel(true);

        assert_eq!(rig.active_reel_policy(), Some(ReelMode::Manual));
        // Receding быстро: auto удлинил бы, manual только укорачивает (rate 5)
        rig.tick(1.0, Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, &mut tethers);
        assert!((rig.wire(Hand::Left).unwrap().max_length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_late_tick_follows_moving_origin() {
        let mut tethers = TetherSet::default();
        let mut rig = centered_rig(ReelMode::Manual);
        rig.fire(Hand::Left, &BodyPose::at(Vec3::ZERO), &wall_at_z(10.0), &mut tethers);

        let moved = BodyPose::at(Vec3::new(1.0, 2.0, 3.0));
        let lines = rig.late_tick(&moved);

        let left = lines[Hand::Left].as_ref().expect("attached hand must have a line");
        assert_eq!(left.len(), 20);
        assert_eq!(left[0], Vec3::new(1.0, 2.0, 3.0));
        assert!((left[19] - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-4);
        assert!(lines[Hand::Right].is_none());
    }

    #[test]
    fn test_origin_offset_rotates_with_body() {
        let world = StaticWorld::default().with_box(StaticBox::from_center(
            Vec3::new(0.0, 0.0, 10.5),
            Vec3::new(20.0, 20.0, 0.5),
        ));
        let mut tethers = TetherSet::default();
        let mut rig = GrappleRig::from_config(&GameplayConfig::default())
            .with_origin_offsets(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        rig.set_aim_direction(Vec3::Z);

        let pose = BodyPose::new(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::PI));
        rig.fire(Hand::Left, &pose, &world, &mut tethers);

        // Левый offset (-1,0,0) после поворота на 180° → (+1,0,0)
        let anchor = rig.anchor_point(Hand::Left).unwrap();
        assert!((anchor.x - 1.0).abs() < 1e-4, "anchor = {:?}", anchor);
    }

    #[test]
    fn test_gas_pull_and_restore() {
        let world = wall_at_z(10.0);
        let mut tethers = TetherSet::default();
        let mut rig = centered_rig(ReelMode::Manual);
        rig.fire(Hand::Left, &BodyPose::at(Vec3::ZERO), &world, &mut tethers);
        rig.fire(Hand::Right, &BodyPose::at(Vec3::ZERO), &world, &mut tethers);

        let direction = rig.combined_anchor_direction(Vec3::ZERO);
        assert!((direction - Vec3::new(0.0, 0.0, 20.0)).length() < 1e-3);

        rig.pull_taut(&mut tethers);
        for (_, wire) in rig.attached() {
            assert_eq!(wire.max_length(), wire.min_length());
        }

        // Тело сместилось - длина восстанавливается к живому расстоянию
        rig.restore_slack(&BodyPose::at(Vec3::new(0.0, 0.0, 4.0)), &mut tethers);
        for (_, wire) in rig.attached() {
            assert!((wire.max_length() - 6.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_zero_aim_keeps_previous_direction() {
        let mut rig = centered_rig(ReelMode::Manual);
        rig.set_aim_direction(Vec3::ZERO);
        assert_eq!(rig.aim_direction(), Vec3::Z);

        rig.set_aim_direction(Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(rig.aim_direction(), Vec3::Y);
    }
}
