//! Merging split fragments of one face back into maximal loops.
//!
//! Fragments are plain vertex loops. Two fragments sharing an edge (used in
//! opposite directions) are joined by dropping that edge; two fragments touching
//! at a single vertex are spliced through it. The merge order is fixed by the
//! vertices themselves, so the output does not depend on fragment order or on
//! where each loop starts.

use hashbrown::HashMap;
use std::hash::Hash;

/// Merge `fragments` until no two loops share an edge or a vertex.
///
/// Loops are returned rotated to their smallest rotation and sorted.
pub fn recompose_face<V>(fragments: Vec<Vec<V>>) -> Vec<Vec<V>>
where
    V: Copy + Eq + Hash + Ord,
{
    let mut loops: Vec<Vec<V>> = fragments
        .into_iter()
        .map(cleanup)
        .filter(|l| l.len() >= 3)
        .collect();

    loop {
        if let Some((with_edge, with_reverse, a, b)) = shared_edge(&loops) {
            let merged = join_at_segment(&loops[with_edge], &loops[with_reverse], a, b);
            replace_pair(&mut loops, with_edge, with_reverse, cleanup(merged));
            continue;
        }
        if let Some((first, second, v)) = shared_vertex(&loops) {
            let merged = join_at_point(&loops[first], &loops[second], v);
            replace_pair(&mut loops, first, second, cleanup(merged));
            continue;
        }
        break;
    }

    let mut out: Vec<Vec<V>> = loops.into_iter().map(canonical_rotation).collect();
    out.sort();
    out
}

fn replace_pair<V>(loops: &mut Vec<Vec<V>>, i: usize, j: usize, merged: Vec<V>) {
    let (hi, lo) = if i > j { (i, j) } else { (j, i) };
    loops.swap_remove(hi);
    loops.swap_remove(lo);
    if merged.len() >= 3 {
        loops.push(merged);
    }
}

/// Smallest directed edge `a → b` of one loop whose reverse `b → a` belongs to
/// another loop: `(loop with a → b, loop with b → a, a, b)`.
fn shared_edge<V>(loops: &[Vec<V>]) -> Option<(usize, usize, V, V)>
where
    V: Copy + Eq + Hash + Ord,
{
    let mut owner: HashMap<(V, V), usize> = HashMap::new();
    for (i, l) in loops.iter().enumerate() {
        for (a, b) in edges(l) {
            owner.entry((a, b)).or_insert(i);
        }
    }
    owner
        .iter()
        .filter_map(|(&(a, b), &i)| match owner.get(&(b, a)) {
            Some(&j) if j != i => Some(((a, b), i, j)),
            _ => None,
        })
        .min_by(|x, y| x.0.cmp(&y.0))
        .map(|((a, b), i, j)| (i, j, a, b))
}

/// Smallest vertex used by two different loops, with the two loops that come
/// first in canonical order.
fn shared_vertex<V>(loops: &[Vec<V>]) -> Option<(usize, usize, V)>
where
    V: Copy + Eq + Hash + Ord,
{
    let mut users: HashMap<V, Vec<usize>> = HashMap::new();
    for (i, l) in loops.iter().enumerate() {
        for &v in l {
            let entry = users.entry(v).or_default();
            if !entry.contains(&i) {
                entry.push(i);
            }
        }
    }
    let (&v, owners) = users
        .iter()
        .filter(|(_, owners)| owners.len() >= 2)
        .min_by(|x, y| x.0.cmp(y.0))?;
    let mut owners = owners.clone();
    owners.sort_by_key(|&i| canonical_rotation(loops[i].clone()));
    Some((owners[0], owners[1], v))
}

fn edges<V: Copy>(l: &[V]) -> impl Iterator<Item = (V, V)> + '_ {
    l.iter().zip(l.iter().cycle().skip(1)).map(|(&a, &b)| (a, b))
}

/// `l` rotated to start at the first occurrence of `v`.
fn rotated_to<V: Copy + Eq>(l: &[V], v: V) -> Vec<V> {
    let start = l.iter().position(|&x| x == v).unwrap_or(0);
    l[start..].iter().chain(l[..start].iter()).copied().collect()
}

/// `l` rotated to start at the `to` of its edge `from → to`.
fn rotated_after_edge<V: Copy + Eq>(l: &[V], from: V, to: V) -> Vec<V> {
    let n = l.len();
    let start = (0..n)
        .find(|&i| l[i] == from && l[(i + 1) % n] == to)
        .map_or(0, |i| (i + 1) % n);
    l[start..].iter().chain(l[..start].iter()).copied().collect()
}

/// Join `p`, which uses edge `a → b`, and `q`, which uses `b → a`, dropping that edge.
pub fn join_at_segment<V: Copy + Eq>(p: &[V], q: &[V], a: V, b: V) -> Vec<V> {
    // p from b around to a, then q strictly between a and b
    let mut merged = rotated_after_edge(p, a, b);
    let q = rotated_after_edge(q, b, a);
    merged.extend(q[1..q.len() - 1].iter().copied());
    merged
}

/// Splice `p` and `q` through their common vertex `v`, which then appears twice.
pub fn join_at_point<V: Copy + Eq>(p: &[V], q: &[V], v: V) -> Vec<V> {
    let mut merged = rotated_to(p, v);
    merged.extend(rotated_to(q, v));
    merged
}

/// Drop repeated neighbours and back-and-forth spikes `x, v, x`.
fn cleanup<V: Copy + Eq>(mut l: Vec<V>) -> Vec<V> {
    'outer: loop {
        let n = l.len();
        if n < 3 {
            return l;
        }
        for i in 0..n {
            if l[i] == l[(i + 1) % n] {
                l.remove((i + 1) % n);
                continue 'outer;
            }
        }
        for i in 0..n {
            if l[(i + n - 1) % n] == l[(i + 1) % n] {
                let next = (i + 1) % n;
                let (hi, lo) = if i > next { (i, next) } else { (next, i) };
                l.remove(hi);
                l.remove(lo);
                continue 'outer;
            }
        }
        return l;
    }
}

/// The lexicographically smallest rotation of `l`.
fn canonical_rotation<V: Copy + Ord>(l: Vec<V>) -> Vec<V> {
    (0..l.len())
        .map(|s| l[s..].iter().chain(l[..s].iter()).copied().collect::<Vec<V>>())
        .min()
        .unwrap_or_default()
}
