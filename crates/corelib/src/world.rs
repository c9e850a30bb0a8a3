//! Tiny entity world: dense arrays of Transform + optional Renderable.

use crate::Vec3;
use crate::transform::Transform;

/// Entity id, an index into the world's component arrays.
pub type Entity = u32;

/// Marks an entity as drawable with the model stored at `model` in the
/// renderer's model list.
#[derive(Clone, Copy, Debug)]
pub struct Renderable {
    pub model: usize,
}

/// Dense single-array world. Entities are never despawned; spawn may
/// allocate, per-frame iteration does not.
#[derive(Default)]
pub struct World {
    transforms: Vec<Transform>,
    renderables: Vec<Option<Renderable>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, transform: Transform, renderable: Option<Renderable>) -> Entity {
        let id = self.transforms.len() as Entity;
        self.transforms.push(transform);
        self.renderables.push(renderable);
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Mutable transform access, e.g. for scripted motion.
    #[inline]
    pub fn transform_mut(&mut self, entity: Entity) -> Option<&mut Transform> {
        self.transforms.get_mut(entity as usize)
    }

    pub fn iter_renderables(&self) -> impl Iterator<Item = (&Transform, &Renderable)> {
        self.transforms
            .iter()
            .zip(self.renderables.iter())
            .filter_map(|(transform, renderable)| {
                renderable.as_ref().map(|r| (transform, r))
            })
    }

    /// Spin every entity by `speed` (Euler radians/sec) scaled by `dt`.
    pub fn rotate_all(&mut self, dt: f32, speed: Vec3) {
        for transform in &mut self.transforms {
            transform.rotation_euler += speed * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    #[test]
    fn spawn_and_iterate_renderables() {
        let mut world = World::new();
        world.spawn(Transform::identity(), Some(Renderable { model: 0 }));
        world.spawn(Transform::identity(), None);
        world.spawn(Transform::identity(), Some(Renderable { model: 1 }));

        let slots: Vec<usize> = world.iter_renderables().map(|(_, r)| r.model).collect();
        assert_eq!(slots, vec![0, 1]);
    }

    #[test]
    fn rotate_all_advances_euler_angles() {
        let mut world = World::new();
        let entity = world.spawn(Transform::identity(), None);
        world.rotate_all(0.5, vec3(0.0, 2.0, 0.0));
        let transform = world.transform_mut(entity).unwrap();
        assert!((transform.rotation_euler.y - 1.0).abs() < 1e-6);
    }
}
