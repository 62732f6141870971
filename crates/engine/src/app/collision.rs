use super::geometry::Aabb;

/// Static impassable volumes, fixed for the lifetime of a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColliderSet {
    colliders: Vec<Aabb>,
}

impl ColliderSet {
    pub fn new(colliders: Vec<Aabb>) -> Self {
        Self { colliders }
    }

    pub fn overlaps(&self, volume: &Aabb) -> bool {
        self.colliders
            .iter()
            .any(|collider| collider.intersects(volume))
    }

    pub fn first_overlap(&self, volume: &Aabb) -> Option<usize> {
        self.colliders
            .iter()
            .position(|collider| collider.intersects(volume))
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aabb> {
        self.colliders.iter()
    }
}
