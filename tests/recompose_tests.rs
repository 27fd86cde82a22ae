use polycsg::recompose::{join_at_point, join_at_segment, recompose_face};

fn rotations(l: &[u32]) -> Vec<Vec<u32>> {
    (0..l.len())
        .map(|s| {
            let mut r = l.to_vec();
            r.rotate_left(s);
            r
        })
        .collect()
}

/// Every combination of fragment order and start offset.
fn all_inputs(p: &[u32], q: &[u32]) -> Vec<Vec<Vec<u32>>> {
    let mut inputs = Vec::new();
    for rp in rotations(p) {
        for rq in rotations(q) {
            inputs.push(vec![rp.clone(), rq.clone()]);
            inputs.push(vec![rq, rp.clone()]);
        }
    }
    inputs
}

// 3---4---5
// |   |   |
// 0---1---2
const LEFT: [u32; 4] = [0, 3, 4, 1];
const RIGHT: [u32; 4] = [1, 4, 5, 2];

#[test]
fn join_at_segment_removes_the_shared_edge() {
    let merged = join_at_segment(&RIGHT, &LEFT, 1, 4);
    assert_eq!(merged, vec![4, 5, 2, 1, 0, 3]);
}

#[test]
fn join_at_point_keeps_both_loops() {
    let merged = join_at_point(&[0, 1, 2], &[5, 2, 6], 2);
    assert_eq!(merged, vec![2, 0, 1, 2, 6, 5]);
}

#[test]
fn shared_edge_merge_is_order_and_rotation_invariant() {
    for input in all_inputs(&LEFT, &RIGHT) {
        assert_eq!(recompose_face(input.clone()), vec![vec![0, 3, 4, 5, 2, 1]], "input {input:?}");
    }
}

#[test]
fn shared_vertex_merge_is_order_and_rotation_invariant() {
    // 10--11
    // |   |
    // 4---12      (left square touches it at 4 only)
    let upper = [4, 10, 11, 12];
    for input in all_inputs(&LEFT, &upper) {
        assert_eq!(
            recompose_face(input.clone()),
            vec![vec![0, 3, 4, 10, 11, 12, 4, 1]],
            "input {input:?}"
        );
    }
}

#[test]
fn three_fragments_in_a_row() {
    // 3---4---5---7
    // |   |   |   |
    // 0---1---2---6
    let fragments = vec![vec![2, 5, 7, 6], vec![0, 3, 4, 1], vec![1, 4, 5, 2]];
    assert_eq!(recompose_face(fragments), vec![vec![0, 3, 4, 5, 7, 6, 2, 1]]);
}

#[test]
fn unrelated_fragments_stay_apart() {
    let fragments = vec![vec![7, 8, 9], vec![0, 3, 4, 1]];
    assert_eq!(recompose_face(fragments), vec![vec![0, 3, 4, 1], vec![7, 8, 9]]);
}

#[test]
fn cancelling_fragments_vanish() {
    let fragments = vec![vec![0, 1, 2], vec![2, 1, 0]];
    assert!(recompose_face(fragments).is_empty());
}
