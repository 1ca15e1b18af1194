//! Hierarchical grouping of embedded statements
//!
//! Divisive 2-means: every level splits each group of the previous level in
//! two, so finer levels always refine coarser ones.

/// Squared euclidean distance
fn dist2(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

pub(crate) fn centroid(points: &[[f64; 2]], members: &[usize]) -> [f64; 2] {
    let n = members.len().max(1) as f64;
    let (sx, sy) = members
        .iter()
        .fold((0.0, 0.0), |(sx, sy), &i| (sx + points[i][0], sy + points[i][1]));
    [sx / n, sy / n]
}

/// Index in `members` of the point farthest from `from` (first on ties)
fn farthest(points: &[[f64; 2]], members: &[usize], from: [f64; 2]) -> usize {
    let mut best = members[0];
    let mut best_d = f64::NEG_INFINITY;
    for &i in members {
        let d = dist2(points[i], from);
        if d > best_d {
            best = i;
            best_d = d;
        }
    }
    best
}

/// Split `members` in two with Lloyd iterations
///
/// Returns `None` when the points cannot be separated (all coincide).
fn two_means(
    points: &[[f64; 2]],
    members: &[usize],
    max_iterations: usize,
) -> Option<(Vec<usize>, Vec<usize>)> {
    if members.len() < 2 {
        return None;
    }

    let a = farthest(points, members, centroid(points, members));
    let b = farthest(points, members, points[a]);
    if dist2(points[a], points[b]) == 0.0 {
        return None;
    }

    let mut centers = [points[a], points[b]];
    let mut assignment: Vec<bool> = Vec::new();

    for _ in 0..max_iterations.max(1) {
        let next: Vec<bool> = members
            .iter()
            .map(|&i| dist2(points[i], centers[1]) < dist2(points[i], centers[0]))
            .collect();
        if next == assignment {
            break;
        }
        assignment = next;

        let (left, right) = partition(members, &assignment);
        if left.is_empty() || right.is_empty() {
            return None;
        }
        centers = [centroid(points, &left), centroid(points, &right)];
    }

    let (left, right) = partition(members, &assignment);
    if left.is_empty() || right.is_empty() {
        None
    } else {
        Some((left, right))
    }
}

fn partition(members: &[usize], assignment: &[bool]) -> (Vec<usize>, Vec<usize>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for (&i, &to_right) in members.iter().zip(assignment) {
        if to_right {
            right.push(i);
        } else {
            left.push(i);
        }
    }
    (left, right)
}

/// Build `levels` layers of group ids, coarsest first
///
/// Groups smaller than `2 * min_cluster_size` are carried down unsplit.
/// Group ids are dense per level and ordered by each group's lowest
/// statement index.
pub fn divisive_hierarchy(
    points: &[[f64; 2]],
    levels: usize,
    min_cluster_size: usize,
    max_iterations: usize,
) -> Vec<Vec<usize>> {
    let split_threshold = (2 * min_cluster_size).max(2);
    let mut groups: Vec<Vec<usize>> = vec![(0..points.len()).collect()];
    let mut layers = Vec::with_capacity(levels);

    for _ in 0..levels {
        let mut next = Vec::with_capacity(groups.len() * 2);
        for group in groups {
            if group.len() >= split_threshold {
                if let Some((left, right)) = two_means(points, &group, max_iterations) {
                    next.push(left);
                    next.push(right);
                    continue;
                }
            }
            next.push(group);
        }
        next.retain(|g| !g.is_empty());
        next.sort_by_key(|g| g[0]);

        let mut labels = vec![0; points.len()];
        for (group_id, group) in next.iter().enumerate() {
            for &i in group {
                labels[i] = group_id;
            }
        }
        layers.push(labels);
        groups = next;
    }

    layers
}
