use algviz_core::{ColorStack, DEFAULT_TRACE_COLORS, Rgb};

fn permutations(items: &[Rgb]) -> Vec<Vec<Rgb>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head);
            out.push(tail);
        }
    }
    out
}

#[test]
fn resolution_ignores_insertion_order() {
    let colors = &DEFAULT_TRACE_COLORS[..4];
    let mut results: Vec<Rgb> = permutations(colors)
        .into_iter()
        .map(|order| {
            let mut stack = ColorStack::new();
            for c in order {
                stack.add(c);
            }
            stack.resolve()
        })
        .collect();
    results.dedup();
    assert_eq!(results.len(), 1);
}

#[test]
fn removal_takes_out_exactly_one_color() {
    let a = DEFAULT_TRACE_COLORS[1];
    let b = DEFAULT_TRACE_COLORS[5];
    let mut stack = ColorStack::new();
    stack.add(a);
    stack.add(a);
    stack.add(b);

    assert!(stack.remove(a));
    assert_eq!(stack.resolve(), b);
    assert!(!stack.remove(a));
    assert_eq!(stack.resolve(), b);
    assert_eq!(stack.iter().collect::<Vec<_>>(), vec![b]);
}

#[test]
fn blending_darkens_per_channel() {
    let mut stack = ColorStack::new();
    stack.add(Rgb::new(255, 128, 0));
    stack.add(Rgb::new(128, 255, 255));
    assert_eq!(stack.resolve(), Rgb::new(128, 128, 0));
    assert_eq!(stack.resolve_over(Rgb::new(100, 100, 100)), Rgb::new(50, 50, 0));
}
