//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree of bounding boxes built once per scene and then shared
//! read-only by every render worker.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::{HitRecord, Hittable};
use lumen_math::{Aabb, Interval, Ray};

/// BVH node with exactly two children.
///
/// Children are either scene objects or nested nodes. A node built over a
/// single object references it on both sides, so traversal never has to
/// handle a missing child.
pub struct BvhNode {
    left: Arc<dyn Hittable>,
    right: Arc<dyn Hittable>,
    bbox: Aabb,
}

impl BvhNode {
    /// Create a BVH from a list of hittable objects.
    ///
    /// Returns `None` for an empty list.
    pub fn new(objects: Vec<Arc<dyn Hittable>>) -> Option<Self> {
        if objects.is_empty() {
            return None;
        }
        Some(Self::build(objects))
    }

    /// Recursive BVH construction.
    ///
    /// Median split: sort by box minimum on the longest axis of the
    /// combined bounds, split in half, recurse.
    fn build(mut objects: Vec<Arc<dyn Hittable>>) -> Self {
        let bbox = objects
            .iter()
            .fold(Aabb::EMPTY, |acc, o| Aabb::surrounding(&acc, &o.bounding_box()));

        match objects.len() {
            1 => {
                let only = Arc::clone(&objects[0]);
                Self {
                    left: Arc::clone(&only),
                    right: only,
                    bbox,
                }
            }
            2 => Self {
                left: Arc::clone(&objects[0]),
                right: Arc::clone(&objects[1]),
                bbox,
            },
            n => {
                let axis = bbox.longest_axis();

                // Stable, so equal keys keep insertion order
                objects.sort_by(|a, b| box_compare(a.as_ref(), b.as_ref(), axis));

                let right_objects = objects.split_off(n / 2);
                let left: Arc<dyn Hittable> = Arc::new(Self::build(objects));
                let right: Arc<dyn Hittable> = Arc::new(Self::build(right_objects));

                Self { left, right, bbox }
            }
        }
    }

    pub fn left(&self) -> &Arc<dyn Hittable> {
        &self.left
    }

    pub fn right(&self) -> &Arc<dyn Hittable> {
        &self.right
    }

    /// Number of levels below and including this node.
    pub fn depth(&self) -> usize {
        fn child_depth(child: &Arc<dyn Hittable>) -> usize {
            child.as_bvh().map_or(0, BvhNode::depth)
        }
        1 + child_depth(&self.left).max(child_depth(&self.right))
    }
}

/// Order two objects by the minimum of their bounding boxes along `axis`.
fn box_compare(a: &dyn Hittable, b: &dyn Hittable, axis: usize) -> Ordering {
    let a_min = a.bounding_box().axis_interval(axis).min;
    let b_min = b.bounding_box().axis_interval(axis).min;
    a_min.partial_cmp(&b_min).unwrap_or(Ordering::Equal)
}

impl Hittable for BvhNode {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        if !self.bbox.hit(ray, ray_t) {
            return None;
        }

        let hit_left = self.left.hit(ray, ray_t);

        // Only check right up to closest hit
        let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
        let hit_right = self.right.hit(ray, Interval::new(ray_t.min, right_max));

        match (hit_left, hit_right) {
            (Some(left), Some(right)) => Some(if right.t < left.t { right } else { left }),
            (left, right) => left.or(right),
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn as_bvh(&self) -> Option<&BvhNode> {
        Some(self)
    }
}
