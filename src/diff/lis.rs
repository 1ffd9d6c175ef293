//! Longest increasing subsequence, used to decide what stays put.

/// Mark the positions of `seq` that lie on a longest strictly increasing
/// subsequence.
///
/// When several subsequences have the maximal length, earlier positions
/// are preferred. For a row that climbs past its neighbour this keeps the
/// neighbour in place and reports the climber as the mover.
pub(crate) fn stable_positions(seq: &[usize]) -> Vec<bool> {
    let mut stable = vec![false; seq.len()];
    if seq.is_empty() {
        return stable;
    }

    // Scanning right to left: heads[k] is the position whose value is the
    // largest possible first element of an increasing run of length k + 1.
    // Values at heads are strictly decreasing in k.
    let mut heads: Vec<usize> = Vec::new();
    let mut next: Vec<Option<usize>> = vec![None; seq.len()];

    for i in (0..seq.len()).rev() {
        let v = seq[i];
        let k = heads.partition_point(|&h| seq[h] > v);
        next[i] = if k > 0 { Some(heads[k - 1]) } else { None };
        if k == heads.len() {
            heads.push(i);
        } else {
            heads[k] = i;
        }
    }

    let mut cursor = heads.last().copied();
    while let Some(i) = cursor {
        stable[i] = true;
        cursor = next[i];
    }

    stable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picked(seq: &[usize]) -> Vec<usize> {
        stable_positions(seq)
            .into_iter()
            .zip(seq)
            .filter(|(keep, _)| *keep)
            .map(|(_, v)| *v)
            .collect()
    }

    #[test]
    fn test_sorted_is_all_stable() {
        assert_eq!(picked(&[0, 1, 2, 3]), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_empty() {
        assert!(stable_positions(&[]).is_empty());
    }

    #[test]
    fn test_adjacent_swap_keeps_earlier() {
        // apple(new 1), banana(new 0): apple stays, banana moves.
        assert_eq!(stable_positions(&[1, 0, 2, 3, 4]), vec![true, false, true, true, true]);
    }

    #[test]
    fn test_long_jump_moves_only_jumper() {
        assert_eq!(
            stable_positions(&[1, 2, 3, 0, 4]),
            vec![true, true, true, false, true]
        );
    }

    #[test]
    fn test_reversed() {
        assert_eq!(picked(&[3, 2, 1, 0]).len(), 1);
    }

    #[test]
    fn test_result_is_increasing_and_maximal() {
        let seq = [4, 1, 5, 2, 6, 3, 0, 7];
        let run = picked(&seq);
        assert!(run.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(run.len(), 4);
    }
}
