use rand::Rng;

/// Which of the two square-ordering algorithms a caller wants.
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
pub enum RandomizerChoice {
    KeySort,
    InPlace,
}

/// Permute by sorting: every element gets an independent uniform key in
/// `[0, n^3)`, and the elements are read back in key order. The sort is the
/// merge sort below, so equal keys resolve the same way on every run.
pub fn permute_by_sorting<R: Rng>(values: &mut [usize], rng: &mut R) {
    let n = values.len();
    if n <= 1 {
        return;
    }
    let key_bound = (n * n * n) as u64;
    let mut keyed: Vec<(u64, usize)> = values
        .iter()
        .map(|&v| (rng.gen_range(0..key_bound), v))
        .collect();
    merge_sort(&mut keyed);
    for (slot, (_, v)) in values.iter_mut().zip(keyed) {
        *slot = v;
    }
}

/// Randomize in place: walks the array once, swapping each element with one
/// at an index drawn from the whole range. The draw is over `[0, n)` at
/// every step, which skews the distribution of orderings away from uniform.
pub fn randomize_in_place<R: Rng>(values: &mut [usize], rng: &mut R) {
    let n = values.len();
    if n == 0 {
        return;
    }
    for i in 0..n {
        let random_index = rng.gen_range(0..n);
        values.swap(i, random_index);
    }
}

// Textbook top-down merge sort over (key, value) pairs, ordering on the
// key alone. O(n log n) on every input.
fn merge_sort(list: &mut [(u64, usize)]) {
    if list.len() <= 1 {
        return;
    }
    let mid = list.len() / 2;
    let mut first_half = list[..mid].to_vec();
    let mut second_half = list[mid..].to_vec();
    merge_sort(&mut first_half);
    merge_sort(&mut second_half);
    merge(&first_half, &second_half, list);
}

fn merge(first: &[(u64, usize)], second: &[(u64, usize)], out: &mut [(u64, usize)]) {
    let mut current1 = 0;
    let mut current2 = 0;
    let mut current3 = 0;

    while current1 < first.len() && current2 < second.len() {
        if first[current1].0 < second[current2].0 {
            out[current3] = first[current1];
            current1 += 1;
        } else {
            out[current3] = second[current2];
            current2 += 1;
        }
        current3 += 1;
    }

    while current1 < first.len() {
        out[current3] = first[current1];
        current1 += 1;
        current3 += 1;
    }
    while current2 < second.len() {
        out[current3] = second[current2];
        current2 += 1;
        current3 += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn is_same_multiset(a: &[usize], b: &[usize]) -> bool {
        let mut a = a.to_vec();
        let mut b = b.to_vec();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }

    #[test]
    fn merge_sort_orders_by_key() {
        let mut list: Vec<(u64, usize)> = vec![(5, 0), (1, 1), (4, 2), (1, 3), (9, 4), (0, 5)];
        merge_sort(&mut list);
        for pair in list.windows(2) {
            assert!(pair[0].0 <= pair[1].0);
        }
    }

    #[test]
    fn key_sort_shuffle_preserves_the_multiset() {
        let mut rng = StdRng::seed_from_u64(11);
        for n in [0usize, 1, 2, 8, 64] {
            let original: Vec<usize> = (0..n).collect();
            let mut shuffled = original.clone();
            permute_by_sorting(&mut shuffled, &mut rng);
            assert!(is_same_multiset(&original, &shuffled));
        }
    }

    #[test]
    fn in_place_shuffle_preserves_the_multiset() {
        let mut rng = StdRng::seed_from_u64(12);
        for n in [0usize, 1, 2, 8, 64] {
            let original: Vec<usize> = (0..n).collect();
            let mut shuffled = original.clone();
            randomize_in_place(&mut shuffled, &mut rng);
            assert!(is_same_multiset(&original, &shuffled));
        }
    }

    // Every element should be able to land on every position. Statistical:
    // with 8 elements and 4000 trials, an unreachable cell would be a bug,
    // not bad luck.
    #[test]
    fn key_sort_shuffle_reaches_every_position() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut seen = [[0u32; 8]; 8];
        for _ in 0..4000 {
            let mut values: Vec<usize> = (0..8).collect();
            permute_by_sorting(&mut values, &mut rng);
            for (pos, v) in values.iter().enumerate() {
                seen[*v][pos] += 1;
            }
        }
        for value in 0..8 {
            for pos in 0..8 {
                assert!(seen[value][pos] > 0, "{} never landed on {}", value, pos);
            }
        }
    }

    #[test]
    fn in_place_shuffle_reaches_every_position() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut seen = [[0u32; 8]; 8];
        for _ in 0..4000 {
            let mut values: Vec<usize> = (0..8).collect();
            randomize_in_place(&mut values, &mut rng);
            for (pos, v) in values.iter().enumerate() {
                seen[*v][pos] += 1;
            }
        }
        for value in 0..8 {
            for pos in 0..8 {
                assert!(seen[value][pos] > 0, "{} never landed on {}", value, pos);
            }
        }
    }
}
