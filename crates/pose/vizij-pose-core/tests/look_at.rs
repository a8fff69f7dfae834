use approx::assert_relative_eq;
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use vizij_pose_core::{
    evaluate, look_at_rotation, Axis, AxisSpec, Binder, LookAt, LookAtConfig, PoseStream, Rig,
    SceneHandle, SetupError, StreamHandle,
};

fn arm_rig() -> Rig {
    Rig::from_json(&vizij_test_fixtures::rigs::json("arm").unwrap()).unwrap()
}

fn look_cfg(min_angle: f32, max_angle: f32) -> LookAtConfig {
    LookAtConfig {
        joint: "shoulder".into(),
        target: "target".into(),
        axis: AxisSpec::Named(Axis::Forward),
        min_angle,
        max_angle,
    }
}

fn move_target(rig: &mut Rig, position: Vector3<f32>) {
    let scene = rig.scene_mut();
    let h = scene.find("target").unwrap();
    scene.set_transform(
        h,
        Isometry3::from_parts(Translation3::from(position), UnitQuaternion::identity()),
    );
}

/// it should leave the joint alone when the target is straight ahead
#[test]
fn target_ahead_gives_zero_correction() {
    let rig = arm_rig();
    let node = LookAt::bind(&rig, &look_cfg(-60.0, 60.0)).unwrap();
    let mut stream = rig.rest_stream();
    let joint = rig.bind_stream_joint("shoulder").unwrap();

    evaluate(&node, &mut stream).unwrap();

    assert!(stream.rotation(joint).angle() < 1e-5);
}

/// it should clamp a 90 degree correction to max_angle
#[test]
fn correction_is_clamped_to_max_angle() {
    let mut rig = arm_rig();
    move_target(&mut rig, Vector3::new(5.0, 1.0, 0.0));
    let node = LookAt::bind(&rig, &look_cfg(-60.0, 60.0)).unwrap();
    let mut stream = rig.rest_stream();
    let joint = node.joint();

    evaluate(&node, &mut stream).unwrap();

    let q = stream.rotation(joint);
    assert_relative_eq!(q.angle().to_degrees(), 60.0, epsilon = 1e-3);
    let forward = q * Vector3::z();
    let expected = Vector3::new(60f32.to_radians().sin(), 0.0, 60f32.to_radians().cos());
    assert_relative_eq!(forward, expected, epsilon = 1e-5);
}

/// it should reach the target exactly when the angle is inside the limits
#[test]
fn correction_inside_limits_is_exact() {
    let mut rig = arm_rig();
    let dir = Vector3::new(30f32.to_radians().sin(), 0.0, 30f32.to_radians().cos());
    move_target(&mut rig, Vector3::new(0.0, 1.0, 0.0) + dir * 3.0);
    let node = LookAt::bind(&rig, &look_cfg(-60.0, 60.0)).unwrap();
    let mut stream = rig.rest_stream();

    evaluate(&node, &mut stream).unwrap();

    let q = stream.rotation(node.joint());
    assert_relative_eq!(q.angle().to_degrees(), 30.0, epsilon = 1e-3);
    assert_relative_eq!(q * Vector3::z(), dir, epsilon = 1e-5);
}

/// it should keep an already-aligned rotated joint unchanged
#[test]
fn aligned_target_keeps_rotation() {
    let mut rig = arm_rig();
    let start = UnitQuaternion::from_euler_angles(0.3, -0.4, 0.2);
    let shoulder = Vector3::new(0.0, 1.0, 0.0);
    move_target(&mut rig, shoulder + start * Vector3::z() * 2.0);
    let node = LookAt::bind(&rig, &look_cfg(-60.0, 60.0)).unwrap();
    let mut stream = rig.rest_stream();
    stream.set_rotation(node.joint(), start);

    evaluate(&node, &mut stream).unwrap();

    assert!(stream.rotation(node.joint()).angle_to(&start) < 1e-4);
}

/// it should never write the joint position, only its rotation
#[test]
fn position_is_never_written() {
    let mut rig = arm_rig();
    move_target(&mut rig, Vector3::new(-3.0, 4.0, 1.0));
    let node = LookAt::bind(&rig, &look_cfg(-90.0, 90.0)).unwrap();
    let mut stream = rig.rest_stream();
    let before = stream.position(node.joint());

    evaluate(&node, &mut stream).unwrap();

    assert_relative_eq!(stream.position(node.joint()), before, epsilon = 1e-6);
}

/// it should honour a custom local axis and reversed limits
#[test]
fn custom_axis_and_reversed_limits() {
    let mut rig = arm_rig();
    move_target(&mut rig, Vector3::new(0.0, 6.0, 0.0));
    let cfg = LookAtConfig {
        axis: AxisSpec::Vector([1.0, 0.0, 0.0]),
        ..look_cfg(20.0, -20.0)
    };
    let node = LookAt::bind(&rig, &cfg).unwrap();
    assert_eq!(node.limits(), (-20.0, 20.0));
    let mut stream = rig.rest_stream();

    evaluate(&node, &mut stream).unwrap();

    // +X turns 20 degrees toward +Y about +Z.
    let q = stream.rotation(node.joint());
    assert_relative_eq!(q.angle().to_degrees(), 20.0, epsilon = 1e-3);
    assert!((q * Vector3::x()).y > 0.0);
}

/// it should never produce NaN for a target directly behind the axis
#[test]
fn target_behind_is_finite() {
    let mut rig = arm_rig();
    move_target(&mut rig, Vector3::new(0.0, 1.0, -4.0));
    let node = LookAt::bind(&rig, &look_cfg(-60.0, 60.0)).unwrap();
    let mut stream = rig.rest_stream();

    evaluate(&node, &mut stream).unwrap();

    let q = stream.rotation(node.joint());
    assert!(q.coords.iter().all(|c| c.is_finite()));
    assert_relative_eq!(q.angle().to_degrees(), 60.0, epsilon = 1e-3);
}

/// it should reject unknown joints and targets at bind time
#[test]
fn bind_errors() {
    let rig = arm_rig();
    let cfg = LookAtConfig {
        joint: "tail".into(),
        ..look_cfg(-60.0, 60.0)
    };
    assert!(matches!(
        LookAt::bind(&rig, &cfg),
        Err(SetupError::UnknownJoint { .. })
    ));
    let cfg = LookAtConfig {
        target: "nowhere".into(),
        ..look_cfg(-60.0, 60.0)
    };
    assert!(matches!(
        LookAt::bind(&rig, &cfg),
        Err(SetupError::UnknownSceneObject { .. })
    ));
}

/// it should clamp with limits given max-first, on the free function too
#[test]
fn free_function_accepts_reversed_limits() {
    let rig = arm_rig();
    let stream = rig.rest_stream();
    let joint = rig.bind_stream_joint("shoulder").unwrap();
    let axis = Vector3::z_axis();
    let target = Vector3::new(5.0, 1.0, 0.0);

    for (min, max) in [(-60.0, 60.0), (60.0, -60.0)] {
        let q = look_at_rotation(
            &stream.rotation(joint),
            &stream.position(joint),
            &target,
            &axis,
            min,
            max,
        );
        assert_relative_eq!(q.angle().to_degrees(), 60.0, epsilon = 1e-3);
    }
}

/// it should refuse NaN angle limits at setup instead of failing every frame
#[test]
fn nan_limits_fail_setup() {
    let rig = arm_rig();
    assert!(matches!(
        LookAt::bind(&rig, &look_cfg(f32::NAN, f32::NAN)),
        Err(SetupError::InvalidAngleLimits { .. })
    ));
    assert!(matches!(
        LookAt::bind(&rig, &look_cfg(-30.0, f32::NAN)),
        Err(SetupError::InvalidAngleLimits { .. })
    ));
}

/// it should check pre-resolved handles against the rig
#[test]
fn from_handles_rejects_unbound_handles() {
    let rig = arm_rig();
    let joint = rig.bind_stream_joint("shoulder").unwrap();
    let target = rig.bind_scene_object("target").unwrap();

    let node = LookAt::from_handles(&rig, joint, target, Vector3::z(), -60.0, 60.0).unwrap();
    assert_eq!(node.joint(), joint);

    assert_eq!(
        LookAt::from_handles(&rig, StreamHandle(99), target, Vector3::z(), -60.0, 60.0)
            .unwrap_err(),
        SetupError::UnboundHandle {
            kind: "stream joint",
            index: 99
        }
    );
    assert_eq!(
        LookAt::from_handles(&rig, joint, SceneHandle(7), Vector3::z(), -60.0, 60.0)
            .unwrap_err(),
        SetupError::UnboundHandle {
            kind: "scene object",
            index: 7
        }
    );
}
