use crate::foundation::error::CastResult;
use crate::scene::model::{Scene, SceneKind};
use crate::scene::timeline::Timeline;

/// Seconds each comparison/swap step stays on screen.
pub const STEP_SECS: f64 = 0.5;

/// One recorded state of the array during the sort.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortStep {
    /// Array contents at this step.
    pub values: Vec<i64>,
    /// Highlighted pair, if the step compares or swaps.
    pub pair: Option<(usize, usize)>,
    /// One-line caption.
    pub caption: String,
}

/// Record every comparison and swap bubble sort performs on `input`.
pub fn sort_steps(input: &[i64]) -> Vec<SortStep> {
    let mut a = input.to_vec();
    let n = a.len();
    let mut steps = vec![SortStep {
        values: a.clone(),
        pair: None,
        caption: "Initial array".to_owned(),
    }];

    for i in 0..n.saturating_sub(1) {
        for j in 0..(n - i - 1) {
            steps.push(SortStep {
                values: a.clone(),
                pair: Some((j, j + 1)),
                caption: format!("Comparing {} and {}", a[j], a[j + 1]),
            });
            if a[j] > a[j + 1] {
                a.swap(j, j + 1);
                steps.push(SortStep {
                    values: a.clone(),
                    pair: Some((j, j + 1)),
                    caption: format!("Swapping {} and {}", a[j + 1], a[j]),
                });
            }
        }
    }

    steps.push(SortStep {
        values: a,
        pair: None,
        caption: "Array is now sorted!".to_owned(),
    });
    steps
}

/// Build a narrated bubble-sort walkthrough: intro, two explanation scenes, one
/// visualization scene per step, outro.
pub fn bubble_sort_timeline(input: &[i64]) -> CastResult<Timeline> {
    let mut tl = Timeline::new("Bubble Sort Algorithm");

    tl.add_scene(
        Scene::builder(SceneKind::Intro, 3.0)
            .payload("title", "Bubble Sort")
            .build(),
    )?;
    tl.add_scene(
        Scene::builder(SceneKind::Narration, 8.0)
            .payload("title", "What is Bubble Sort?")
            .narration(
                "Bubble Sort is a simple sorting algorithm that repeatedly steps through the \
                 list, compares adjacent elements, and swaps them if they are in the wrong order.",
            )
            .build(),
    )?;
    tl.add_scene(
        Scene::builder(SceneKind::Narration, 6.0)
            .payload("title", "Time Complexity: O(n²)")
            .narration(
                "The time complexity of Bubble Sort is O of n squared in the worst and average \
                 case, and O of n in the best case when the array is already sorted.",
            )
            .build(),
    )?;
    tl.add_scene(
        Scene::builder(SceneKind::CodeDisplay, 6.0)
            .payload(
                "code",
                "for i in 0..n - 1 {\n    for j in 0..n - i - 1 {\n        if a[j] > a[j + 1] {\n            a.swap(j, j + 1);\n        }\n    }\n}",
            )
            .build(),
    )?;

    for step in sort_steps(input) {
        let mut b = Scene::builder(SceneKind::Visualization, STEP_SECS)
            .payload("title", "Bubble Sort")
            .payload("array", step.values)
            .narration(step.caption);
        if let Some((h1, h2)) = step.pair {
            b = b.payload("highlight1", h1 as u64).payload("highlight2", h2 as u64);
        }
        tl.add_scene(b.build())?;
    }

    tl.add_scene(Scene::builder(SceneKind::Outro, 3.0).build())?;
    Ok(tl)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/bubble_sort.rs"]
mod tests;
