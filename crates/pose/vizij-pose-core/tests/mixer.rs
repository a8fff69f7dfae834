use approx::assert_relative_eq;
use nalgebra::{UnitQuaternion, Vector3};
use vizij_pose_core::{
    evaluate, Binder, BoneWeights, FrameError, Mixer, MixerConfig, PoseBuffer, PoseJob,
    PoseStream, Rig, SetupError, StreamHandle,
};

fn humanoid() -> Rig {
    Rig::from_json(&vizij_test_fixtures::rigs::json("humanoid").unwrap()).unwrap()
}

/// Input 1: every joint turned 90 degrees about Y with stretched offsets.
fn posed_input(rig: &Rig, handles: &[StreamHandle]) -> PoseBuffer {
    let mut b = rig
        .rest_stream()
        .with_root_motion(Vector3::new(2.0, 0.0, 4.0), Vector3::new(0.0, 1.0, 0.0));
    let turn = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f32::consts::FRAC_PI_2);
    for &h in handles {
        let p = b.local_position(h) * 2.0;
        b.set_local_pose(h, p, turn);
    }
    b
}

fn setup(weight: f32) -> (Mixer, PoseBuffer, PoseBuffer, PoseBuffer) {
    let rig = humanoid();
    let mixer = Mixer::bind(
        &rig,
        &MixerConfig {
            root: "root".into(),
            weight,
        },
    )
    .unwrap();
    let a = rig
        .rest_stream()
        .with_root_motion(Vector3::new(1.0, 0.0, 0.0), Vector3::zeros());
    let b = posed_input(&rig, mixer.handles());
    let stream = rig.rest_stream().with_inputs(vec![a.clone(), b.clone()]);
    (mixer, a, b, stream)
}

fn assert_joint_matches(stream: &PoseBuffer, expected: &PoseBuffer, h: StreamHandle) {
    assert_relative_eq!(
        stream.local_position(h),
        expected.local_position(h),
        epsilon = 1e-5
    );
    assert!(
        stream.local_rotation(h).angle_to(&expected.local_rotation(h)) < 1e-4,
        "rotation mismatch on joint {}",
        h.0
    );
}

/// it should cover every joint below the root, excluding the root
#[test]
fn bind_covers_flattened_hierarchy() {
    let rig = humanoid();
    let mixer = Mixer::bind(
        &rig,
        &MixerConfig {
            root: "root".into(),
            weight: 0.0,
        },
    )
    .unwrap();
    assert_eq!(mixer.handles().len(), rig.skeleton().len() - 1);
    assert!(!mixer.handles().contains(&rig.bind_stream_joint("root").unwrap()));
    assert!(mixer.bone_weights().as_slice().iter().all(|w| *w == 1.0));
}

/// it should output input 0 exactly at weight 0
#[test]
fn weight_zero_matches_input_a() {
    let (mixer, a, _b, mut stream) = setup(0.0);
    evaluate(&mixer, &mut stream).unwrap();
    for &h in mixer.handles() {
        assert_joint_matches(&stream, &a, h);
    }
    assert_relative_eq!(stream.velocity(), a.velocity());
}

/// it should output input 1 exactly at weight 1
#[test]
fn weight_one_matches_input_b() {
    let (mixer, _a, b, mut stream) = setup(1.0);
    evaluate(&mixer, &mut stream).unwrap();
    for &h in mixer.handles() {
        assert_joint_matches(&stream, &b, h);
    }
    assert_relative_eq!(stream.velocity(), b.velocity());
    assert_relative_eq!(stream.angular_velocity(), b.angular_velocity());
}

/// it should lerp positions and slerp rotations at intermediate weights
#[test]
fn halfway_blend() {
    let (mixer, a, b, mut stream) = setup(0.5);
    evaluate(&mixer, &mut stream).unwrap();
    let h = mixer.handles()[3];
    assert_relative_eq!(
        stream.local_position(h),
        (a.local_position(h) + b.local_position(h)) * 0.5,
        epsilon = 1e-5
    );
    assert_relative_eq!(
        stream.local_rotation(h).angle(),
        std::f32::consts::FRAC_PI_4,
        epsilon = 1e-4
    );
    assert_relative_eq!(
        stream.velocity(),
        Vector3::new(1.5, 0.0, 2.0),
        epsilon = 1e-6
    );
    assert_relative_eq!(
        stream.angular_velocity(),
        Vector3::new(0.0, 0.5, 0.0),
        epsilon = 1e-6
    );
}

/// it should freeze a joint with bone weight 0 at input 0 for any global weight
#[test]
fn zero_bone_weight_freezes_joint() {
    let (mut mixer, a, b, _) = setup(0.0);
    let frozen = 5;
    mixer.bone_weights_mut().set(frozen, 0.0);
    for weight in [0.0, 0.3, 0.7, 1.0] {
        mixer.set_weight(weight);
        let mut stream = a.clone().with_inputs(vec![a.clone(), b.clone()]);
        evaluate(&mixer, &mut stream).unwrap();

        let h = mixer.handles()[frozen];
        assert_joint_matches(&stream, &a, h);

        // Unmasked joints still track the global weight.
        let other = mixer.handles()[frozen + 1];
        assert_relative_eq!(
            stream.local_rotation(other).angle(),
            weight * std::f32::consts::FRAC_PI_2,
            epsilon = 1e-4
        );
    }
}

/// it should clamp out-of-range weights rather than extrapolate
#[test]
fn out_of_range_weight_is_clamped() {
    let (mut mixer, _a, b, mut stream) = setup(0.0);
    mixer.set_weight(3.0);
    evaluate(&mixer, &mut stream).unwrap();
    for &h in mixer.handles() {
        assert_joint_matches(&stream, &b, h);
    }
}

/// it should fail without touching the stream when an input is missing
#[test]
fn missing_input_leaves_stream_untouched() {
    let (mixer, a, _b, _) = setup(1.0);
    let mut stream = a.clone().with_inputs(vec![a.clone()]);
    stream.set_velocity(Vector3::new(9.0, 9.0, 9.0));
    let before = stream.clone();

    assert_eq!(
        mixer.process_root_motion(&mut stream),
        Err(FrameError::MissingInput { slot: 1 })
    );
    assert_eq!(
        evaluate(&mixer, &mut stream),
        Err(FrameError::MissingInput { slot: 1 })
    );
    assert_eq!(stream.velocity(), before.velocity());
    for &h in mixer.handles() {
        assert_joint_matches(&stream, &before, h);
    }
}

/// it should refuse handles that do not address a joint of the rig
#[test]
fn from_handles_rejects_unbound_handles() {
    let rig = humanoid();
    let hips = rig.bind_stream_joint("hips").unwrap();
    let mixer = Mixer::from_handles(&rig, vec![hips], BoneWeights::ones(1), 0.5).unwrap();
    assert_eq!(mixer.handles(), &[hips]);

    assert_eq!(
        Mixer::from_handles(
            &rig,
            vec![hips, StreamHandle(99)],
            BoneWeights::ones(2),
            0.5
        )
        .unwrap_err(),
        SetupError::UnboundHandle {
            kind: "stream joint",
            index: 99
        }
    );
}
