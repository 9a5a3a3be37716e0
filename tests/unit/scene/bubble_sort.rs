use super::*;

#[test]
fn steps_end_sorted_and_record_swaps() {
    let steps = sort_steps(&[3, 1, 2]);
    assert_eq!(steps.first().unwrap().values, vec![3, 1, 2]);
    assert_eq!(steps.last().unwrap().values, vec![1, 2, 3]);
    assert!(steps.iter().any(|s| s.caption.starts_with("Swapping 3 and 1")));
    // Comparisons for n=3: 2 + 1, plus two swaps, plus initial and final.
    assert_eq!(steps.len(), 3 + 2 + 2);
}

#[test]
fn sorted_input_only_compares() {
    let steps = sort_steps(&[1, 2, 3, 4]);
    assert!(steps.iter().all(|s| !s.caption.starts_with("Swapping")));
}

#[test]
fn timeline_is_contiguous_and_ends_with_outro() {
    let tl = bubble_sort_timeline(&[5, 1, 4]).unwrap();
    let scenes = tl.scenes();
    for w in scenes.windows(2) {
        assert_eq!(w[0].end_time(), w[1].start_time);
    }
    assert_eq!(scenes.last().unwrap().kind, SceneKind::Outro);

    let vis: Vec<_> = scenes
        .iter()
        .filter(|s| s.kind == SceneKind::Visualization)
        .collect();
    assert_eq!(vis.len(), sort_steps(&[5, 1, 4]).len());
    assert_eq!(vis[1].payload_i64("highlight1"), Some(0));
    assert_eq!(vis[1].payload_i64_array("array"), Some(vec![5, 1, 4]));
}
