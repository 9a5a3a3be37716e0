use super::*;
use std::sync::Arc;

fn frame(v: u8) -> FrameRGBA {
    FrameRGBA {
        width: 1,
        height: 1,
        data: vec![v, v, v, 255],
    }
}

#[test]
fn take_if_present_returns_the_frame_once() {
    let buf = ReorderBuffer::new();
    buf.put(FrameIndex(3), frame(3)).unwrap();
    let taken = buf.take_if_present(FrameIndex(3)).unwrap();
    assert_eq!(taken.idx, FrameIndex(3));
    assert_eq!(taken.image, frame(3));
    assert!(buf.take_if_present(FrameIndex(3)).is_none());
    assert!(buf.is_empty());
}

#[test]
fn put_is_last_write_wins() {
    let buf = ReorderBuffer::new();
    buf.put(FrameIndex(0), frame(1)).unwrap();
    buf.put(FrameIndex(0), frame(2)).unwrap();
    assert_eq!(buf.len(), 1);
    assert_eq!(buf.take_if_present(FrameIndex(0)).map(|f| f.image), Some(frame(2)));
}

#[test]
fn retired_indices_are_rejected() {
    let buf = ReorderBuffer::new();
    buf.retire_below(FrameIndex(5));
    assert!(buf.put(FrameIndex(4), frame(0)).is_err());
    buf.put(FrameIndex(5), frame(0)).unwrap();
}

#[test]
fn concurrent_inserts_track_peak() {
    let buf = Arc::new(ReorderBuffer::new());
    std::thread::scope(|s| {
        for t in 0..4u64 {
            let buf = buf.clone();
            s.spawn(move || {
                for i in 0..25u64 {
                    buf.put(FrameIndex(t * 25 + i), frame(0)).unwrap();
                }
            });
        }
    });
    assert_eq!(buf.len(), 100);
    assert_eq!(buf.peak(), 100);
    for i in 0..100 {
        assert!(buf.take_if_present(FrameIndex(i)).is_some());
    }
    assert!(buf.is_empty());
    assert_eq!(buf.peak(), 100);
}

#[test]
fn racing_put_and_take_never_wraps_len() {
    const N: u64 = 20_000;
    let buf = Arc::new(ReorderBuffer::new());
    std::thread::scope(|s| {
        let producer = buf.clone();
        s.spawn(move || {
            for i in 0..N {
                producer.put(FrameIndex(i), frame(0)).unwrap();
            }
        });
        let consumer = buf.clone();
        s.spawn(move || {
            let mut next = 0;
            while next < N {
                assert!(consumer.len() <= N as usize);
                if consumer.take_if_present(FrameIndex(next)).is_some() {
                    next += 1;
                } else {
                    std::hint::spin_loop();
                }
            }
        });
    });
    assert!(buf.is_empty());
    assert!(buf.peak() <= N as usize);
}
