//! Scene container: the list of objects to render and its optional BVH.

use std::sync::Arc;

use crate::{BvhNode, HitRecord, Hittable};
use lumen_math::{Aabb, Interval, Ray};

/// An ordered collection of hittable objects.
///
/// Built with `&mut self` before rendering, then shared by reference with
/// every worker. Queries go through the BVH once [`Scene::enable_bvh`] has
/// compiled one, and through a linear scan otherwise.
#[derive(Default)]
pub struct Scene {
    objects: Vec<Arc<dyn Hittable>>,
    bbox: Aabb,
    bvh: Option<BvhNode>,
}

impl Scene {
    /// Create an empty scene with no BVH.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object.
    ///
    /// A previously built BVH no longer covers the scene, so it is dropped.
    pub fn add(&mut self, object: Arc<dyn Hittable>) {
        if self.bvh.take().is_some() {
            log::warn!("Object added after BVH build, falling back to linear scan until rebuilt");
        }
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    /// Append every object from an iterator.
    pub fn add_all<I>(&mut self, objects: I)
    where
        I: IntoIterator<Item = Arc<dyn Hittable>>,
    {
        for object in objects {
            self.add(object);
        }
    }

    /// Remove all objects and any BVH.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.bbox = Aabb::EMPTY;
        self.bvh = None;
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Arc<dyn Hittable>] {
        &self.objects
    }

    pub fn bvh(&self) -> Option<&BvhNode> {
        self.bvh.as_ref()
    }

    /// Whether queries currently go through a BVH.
    pub fn uses_bvh(&self) -> bool {
        self.bvh.is_some()
    }

    /// Build (or drop) the acceleration structure.
    ///
    /// Enabling always rebuilds from the current object list, discarding
    /// any cached tree.
    pub fn enable_bvh(&mut self, enable: bool) {
        self.bvh = None;
        if !enable {
            return;
        }

        let start = std::time::Instant::now();
        self.bvh = BvhNode::new(self.objects.clone());

        match &self.bvh {
            Some(bvh) => log::info!(
                "Built BVH over {} objects (depth {}) in {:.2?}",
                self.objects.len(),
                bvh.depth(),
                start.elapsed()
            ),
            None => log::warn!("BVH requested for an empty scene, nothing to build"),
        }
    }

    /// Closest hit by scanning every object.
    ///
    /// The upper bound shrinks to each accepted hit, so later objects are
    /// only tested for strictly closer intersections.
    pub fn hit_anything<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            let max = closest.as_ref().map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = object.hit(ray, Interval::new(ray_t.min, max)) {
                closest = Some(rec);
            }
        }

        closest
    }
}

impl Hittable for Scene {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        match &self.bvh {
            Some(bvh) => bvh.hit(ray, ray_t),
            None => self.hit_anything(ray, ray_t),
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

impl Extend<Arc<dyn Hittable>> for Scene {
    fn extend<I: IntoIterator<Item = Arc<dyn Hittable>>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}
