//! Surface area heuristic split selection.
//!
//! Primitives are binned by centroid into [`NUM_BUCKETS`] equal-width buckets
//! along the axis where the centroids spread the most, and the split between
//! buckets that minimizes the expected traversal cost wins.

use lumen_math::{Aabb, Point3};

use super::info::PrimitiveInfo;
use super::MAX_LEAF_PRIMITIVES;

/// Number of SAH buckets.
pub(crate) const NUM_BUCKETS: usize = 16;

/// Bounds of a range of primitives and of their centroids.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RangeBounds {
    pub aabb: Aabb,
    pub centroids: Aabb,
}

impl RangeBounds {
    pub fn of(infos: &[PrimitiveInfo]) -> Self {
        let mut bounds = Self::default();
        for info in infos {
            bounds.aabb.merge(&info.aabb);
            bounds.centroids.include_point(&info.centroid);
        }
        bounds
    }

    pub fn merge(&mut self, other: &RangeBounds) {
        self.aabb.merge(&other.aabb);
        self.centroids.merge(&other.centroids);
    }
}

/// Primitive count and bounds of one bucket.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Bucket {
    pub count: u32,
    pub aabb: Aabb,
}

pub(crate) type Buckets = [Bucket; NUM_BUCKETS];

/// Bucket of `centroid` along `axis`, given the centroid bounds of its range.
#[inline]
pub(crate) fn bucket_index(centroid: &Point3, centroids: &Aabb, axis: usize) -> usize {
    let offset =
        (centroid[axis] - centroids.min[axis]) / (centroids.max[axis] - centroids.min[axis]);
    ((NUM_BUCKETS as f64 * offset) as usize).min(NUM_BUCKETS - 1)
}

/// Bin `infos` along `axis`.
pub(crate) fn fill_buckets(infos: &[PrimitiveInfo], centroids: &Aabb, axis: usize) -> Buckets {
    let mut buckets = Buckets::default();
    for info in infos {
        let bucket = &mut buckets[bucket_index(&info.centroid, centroids, axis)];
        bucket.count += 1;
        bucket.aabb.merge(&info.aabb);
    }
    buckets
}

/// Add the contents of `other` to `buckets`.
pub(crate) fn merge_buckets(buckets: &mut Buckets, other: &Buckets) {
    for (bucket, other) in buckets.iter_mut().zip(other) {
        bucket.count += other.count;
        bucket.aabb.merge(&other.aabb);
    }
}

/// The cheapest split: buckets `0..=bucket` go left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BucketSplit {
    pub bucket: usize,
    pub cost: f64,
}

/// Evaluate every split between adjacent buckets.
///
/// The cost of putting buckets `0..=i` left is
/// `1 + (n_left·SA(left) + n_right·SA(right)) / SA(aabb)`. Ties keep the
/// lower split index.
pub(crate) fn best_split(buckets: &Buckets, aabb: &Aabb) -> BucketSplit {
    let total_area = aabb.surface_area();
    let mut best = BucketSplit {
        bucket: 0,
        cost: f64::INFINITY,
    };

    for split in 0..NUM_BUCKETS - 1 {
        let (left, right) = buckets.split_at(split + 1);
        let (left_count, left_aabb) = accumulate(left);
        let (right_count, right_aabb) = accumulate(right);

        let cost = 1.0
            + (f64::from(left_count) * left_aabb.surface_area()
                + f64::from(right_count) * right_aabb.surface_area())
                / total_area;

        if cost < best.cost {
            best = BucketSplit {
                bucket: split,
                cost,
            };
        }
    }

    best
}

fn accumulate(buckets: &[Bucket]) -> (u32, Aabb) {
    buckets.iter().fold((0, Aabb::empty()), |(count, mut aabb), bucket| {
        aabb.merge(&bucket.aabb);
        (count + bucket.count, aabb)
    })
}

/// Whether a range of `count` primitives is better off as a leaf than split
/// at `split`.
pub(crate) fn prefers_leaf(split: &BucketSplit, count: usize) -> bool {
    count <= MAX_LEAF_PRIMITIVES && split.cost >= count as f64
}

/// Reorder `infos` so every element matching `goes_left` comes first, and
/// return how many did.
pub(crate) fn partition<F>(infos: &mut [PrimitiveInfo], goes_left: F) -> usize
where
    F: Fn(&PrimitiveInfo) -> bool,
{
    let mut left = 0;
    let mut right = infos.len();

    while left < right {
        if goes_left(&infos[left]) {
            left += 1;
        } else {
            right -= 1;
            infos.swap(left, right);
        }
    }

    left
}

/// How a range of at least two primitives with non-degenerate centroid
/// bounds should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Split {
    /// Keep the whole range in one leaf.
    Leaf,
    /// `infos[..mid]` goes left, `infos[mid..]` right.
    At(usize),
}

/// Choose and apply the split of `infos` along `axis`.
///
/// Two primitives are simply ordered by centroid and split one each. Larger
/// ranges are binned; the range becomes a leaf when it is small and no split
/// beats intersecting everything.
pub(crate) fn split_range(infos: &mut [PrimitiveInfo], bounds: &RangeBounds, axis: usize) -> Split {
    if infos.len() == 2 {
        if infos[1].centroid[axis] < infos[0].centroid[axis] {
            infos.swap(0, 1);
        }
        return Split::At(1);
    }

    let buckets = fill_buckets(infos, &bounds.centroids, axis);
    let split = best_split(&buckets, &bounds.aabb);
    if prefers_leaf(&split, infos.len()) {
        return Split::Leaf;
    }

    Split::At(partition_at(infos, &bounds.centroids, axis, split.bucket))
}

/// Partition `infos` so everything binned at or below `bucket` comes first.
pub(crate) fn partition_at(
    infos: &mut [PrimitiveInfo],
    centroids: &Aabb,
    axis: usize,
    bucket: usize,
) -> usize {
    partition(infos, |info| bucket_index(&info.centroid, centroids, axis) <= bucket)
}
