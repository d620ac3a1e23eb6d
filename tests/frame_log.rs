//! End-to-end behavior of frame logs on real files
//!
//! Covers round trips, length, random access, end of stream, sticky failure
//! and truncated files for both headerless and headered logs.

use anyhow::{Result, ensure};
use framelog::types::{Vector3, Vector4};
use framelog::{
    Frame, FrameLayout, FrameLog, FrameLogError, HandState, LogConfig, LogMode, LogOptions, LogState, Point2,
    TrackingState,
};
use proptest::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn tiny() -> FrameLayout {
    FrameLayout::new(4, 4, 1, 1)
}

prop_compose! {
    fn arb_layout()(
        width in 1u32..9,
        height in 1u32..9,
        body_count in 1u32..4,
        joint_count in 1u32..6,
    ) -> FrameLayout {
        FrameLayout::new(width, height, body_count, joint_count)
    }
}

fn arb_frame(layout: FrameLayout) -> impl Strategy<Value = Frame> {
    let pixels = layout.pixel_count();
    let bodies = layout.body_count as usize;
    let joints = layout.joint_count as usize;
    let finite = -1000.0f32..1000.0f32;

    let joint = (
        prop::array::uniform3(finite.clone()),
        prop::array::uniform4(finite.clone()),
        prop::sample::select(vec![TrackingState::NotTracked, TrackingState::Inferred, TrackingState::Tracked]),
    )
        .prop_map(|(p, o, state)| framelog::Joint {
            position: Vector3 { x: p[0], y: p[1], z: p[2] },
            orientation: Vector4 { x: o[0], y: o[1], z: o[2], w: o[3] },
            state,
        });
    let hand = prop::sample::select(vec![
        HandState::Unknown,
        HandState::NotTracked,
        HandState::Open,
        HandState::Closed,
        HandState::Lasso,
    ]);
    let body = (any::<bool>(), prop::collection::vec(joint, joints), hand.clone(), hand, any::<i64>()).prop_map(
        |(tracked, joints, left_hand_state, right_hand_state, timestamp)| framelog::Body {
            tracked,
            joints,
            left_hand_state,
            right_hand_state,
            timestamp,
        },
    );
    let row = prop::collection::vec((finite.clone(), finite).prop_map(|(x, y)| Point2::new(x, y)), joints);

    (
        prop::collection::vec(any::<u16>(), pixels),
        any::<i64>(),
        prop::collection::vec(any::<u16>(), pixels),
        any::<i64>(),
        prop::collection::vec(body, bodies),
        prop::collection::vec(row, bodies),
    )
        .prop_map(move |(depth, depth_timestamp, infrared, infrared_timestamp, bodies, joint_projections)| Frame {
            depth: framelog::DepthImage::from_samples(layout.width, layout.height, depth)
                .expect("strategy yields pixel_count samples"),
            depth_timestamp,
            infrared: framelog::DepthImage::from_samples(layout.width, layout.height, infrared)
                .expect("strategy yields pixel_count samples"),
            infrared_timestamp,
            bodies,
            joint_projections,
        })
}

fn arb_log() -> impl Strategy<Value = (FrameLayout, Vec<Frame>)> {
    arb_layout().prop_flat_map(|layout| (Just(layout), prop::collection::vec(arb_frame(layout), 1..6)))
}

fn write_all(path: &Path, options: LogOptions, frames: &[Frame]) -> framelog::Result<()> {
    let mut log = FrameLog::writer(path, options)?;
    for frame in frames {
        log.write(frame)?;
    }
    log.close()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn round_trip_is_bit_identical((layout, frames) in arb_log(), headered in any::<bool>()) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rt.flog");
        let options = if headered { LogOptions::headered(layout) } else { LogOptions::legacy(layout) };
        write_all(&path, options, &frames).unwrap();

        let mut log = FrameLog::reader(&path, options).unwrap();
        prop_assert_eq!(log.length().unwrap(), frames.len() as u64);
        for expected in &frames {
            let frame = log.read().unwrap();
            prop_assert_eq!(&frame, expected);
        }
        prop_assert!(log.read().unwrap_err().is_end_of_stream());
        prop_assert!(log.eof());
    }

    #[test]
    fn seek_matches_sequential_read((layout, frames) in arb_log(), pick in any::<prop::sample::Index>()) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seek.flog");
        let options = LogOptions::legacy(layout);
        write_all(&path, options, &frames).unwrap();
        let i = pick.index(frames.len());

        let mut sequential = FrameLog::reader(&path, options).unwrap();
        for _ in 0..i {
            sequential.read().unwrap();
        }
        let by_scan = sequential.read().unwrap();

        let mut random = FrameLog::reader(&path, options).unwrap();
        random.seek_frame(i as u64).unwrap();
        let by_seek = random.read().unwrap();

        prop_assert_eq!(by_seek, by_scan);
    }

    #[test]
    fn truncated_tail_is_excluded(count in 1u64..5, extra in 1usize..128) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trunc.flog");
        let layout = tiny();
        let frames: Vec<Frame> = (0..count).map(|_| Frame::new(layout)).collect();
        write_all(&path, LogOptions::legacy(layout), &frames).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        bytes.extend(std::iter::repeat_n(0u8, extra));
        std::fs::write(&path, &bytes).unwrap();

        let mut log = FrameLog::reader(&path, LogOptions::legacy(layout)).unwrap();
        prop_assert_eq!(log.length().unwrap(), count);
        log.seek_frame(count).unwrap();
        prop_assert!(log.read().is_err());
        prop_assert!(log.eof());
    }
}

#[test]
fn three_tiny_frames_make_a_384_byte_file() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("scenario.flog");
    let layout = tiny();
    ensure!(layout.record_size() == 4 * 4 * 2 + 8 + 4 * 4 * 2 + 8 + 40 + 8);

    write_all(&path, LogOptions::legacy(layout), &vec![Frame::new(layout); 3])?;
    assert_eq!(std::fs::metadata(&path)?.len(), 3 * 128);

    let mut log = FrameLog::reader(&path, LogOptions::legacy(layout))?;
    assert_eq!(log.length()?, 3);
    Ok(())
}

#[test]
fn length_after_reopen_matches_frames_written() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("count.flog");
    let layout = FrameLayout::new(8, 6, 2, 3);
    let options = LogOptions::headered(layout);
    write_all(&path, options, &vec![Frame::new(layout); 7])?;

    let mut log = FrameLog::new(options);
    log.open(&path, LogMode::Read)?;
    assert_eq!(log.length()?, 7);
    assert_eq!(log.size()?, 32 + 7 * layout.record_size() as u64);
    Ok(())
}

#[test]
fn failed_open_is_sticky_and_touches_nothing() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("nope.flog");
    let layout = tiny();
    let mut log = FrameLog::new(LogOptions::legacy(layout));

    assert!(log.open(&path, LogMode::Read).is_err());
    assert!(log.failed());
    for _ in 0..3 {
        assert!(matches!(log.read(), Err(FrameLogError::NotReady { state: LogState::Failed })));
        assert!(matches!(log.write(&Frame::new(layout)), Err(FrameLogError::NotReady { .. })));
    }
    assert_eq!(log.position(), 0);
    assert!(!log.eof());
    assert!(!path.exists());
    Ok(())
}

#[test]
fn unwritable_path_fails_write_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("out.flog");
    let err = FrameLog::writer(&path, LogOptions::legacy(tiny())).unwrap_err();
    assert!(matches!(err, FrameLogError::Open { mode: LogMode::Write, .. }));
    assert!(err.is_sticky());
}

#[test]
fn config_drives_reader_and_writer() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("cfg.flog");
    let config = LogConfig::from_yaml_str("layout: { width: 3, height: 2, body_count: 1, joint_count: 2 }\nformat: legacy")?;

    let frame = Frame::new(config.layout);
    write_all(&path, config.options(), std::slice::from_ref(&frame))?;
    assert_eq!(std::fs::metadata(&path)?.len(), config.layout.record_size() as u64);

    let mut log = FrameLog::reader(&path, config.into())?;
    assert_eq!(log.read()?, frame);
    Ok(())
}
