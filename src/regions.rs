//! Head/body partition of the mesh list.

use crate::{compositor::RigTransforms, scene::MeshEntry};
use log::info;
use nalgebra::Matrix4;

/// Region a mesh belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshRegion {
    /// Rotates with the tracked head
    Head,
    /// Stays under the base model transform
    Body,
}

/// Classify one mesh name: case-insensitive substring match against the keywords
#[must_use]
pub fn classify_name<S: AsRef<str>>(name: &str, keywords: &[S]) -> MeshRegion {
    let lowered = name.to_lowercase();
    if keywords
        .iter()
        .any(|keyword| lowered.contains(&keyword.as_ref().to_lowercase()))
    {
        MeshRegion::Head
    } else {
        MeshRegion::Body
    }
}

/// Disjoint head and body index sets covering every mesh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionPartition {
    pub head: Vec<usize>,
    pub body: Vec<usize>,
}

impl RegionPartition {
    /// Total number of classified meshes
    #[must_use]
    pub fn len(&self) -> usize {
        self.head.len() + self.body.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Region of a mesh index, `None` if it was never classified
    #[must_use]
    pub fn region_of(&self, index: usize) -> Option<MeshRegion> {
        if self.head.contains(&index) {
            Some(MeshRegion::Head)
        } else if self.body.contains(&index) {
            Some(MeshRegion::Body)
        } else {
            None
        }
    }

    /// Draw order for one frame: the body pass, then the head pass, each mesh
    /// paired with the transform of its region
    pub fn draw_batches<'a>(
        &'a self,
        transforms: &'a RigTransforms,
    ) -> impl Iterator<Item = (usize, &'a Matrix4<f32>)> + 'a {
        self.body
            .iter()
            .map(move |&index| (index, &transforms.body))
            .chain(self.head.iter().map(move |&index| (index, &transforms.head)))
    }
}

/// Partition meshes into head and body regions, preserving mesh order
#[must_use]
pub fn classify_meshes<S: AsRef<str>>(meshes: &[MeshEntry], keywords: &[S]) -> RegionPartition {
    let mut partition = RegionPartition::default();

    for (index, mesh) in meshes.iter().enumerate() {
        match classify_name(mesh.name(), keywords) {
            MeshRegion::Head => partition.head.push(index),
            MeshRegion::Body => partition.body.push(index),
        }
    }

    info!(
        "Classified {} meshes: {} head, {} body",
        meshes.len(),
        partition.head.len(),
        partition.body.len()
    );
    partition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HEAD_REGION_KEYWORDS;

    #[test]
    fn test_classify_name() {
        assert_eq!(classify_name("J_Bip_C_Head", &HEAD_REGION_KEYWORDS), MeshRegion::Head);
        assert_eq!(classify_name("HAIR_back", &HEAD_REGION_KEYWORDS), MeshRegion::Head);
        assert_eq!(classify_name("Face.baked", &HEAD_REGION_KEYWORDS), MeshRegion::Head);
        assert_eq!(classify_name("Body", &HEAD_REGION_KEYWORDS), MeshRegion::Body);
        assert_eq!(classify_name("", &HEAD_REGION_KEYWORDS), MeshRegion::Body);
        // Exact substring only
        assert_eq!(classify_name("H-e-a-d", &HEAD_REGION_KEYWORDS), MeshRegion::Body);
    }

    #[test]
    fn test_partition_covers_all_meshes() {
        let meshes: Vec<MeshEntry> = ["Body", "Hair_Front", "J_Bip_C_Head", "Sleeve"]
            .into_iter()
            .map(MeshEntry::named)
            .collect();

        let partition = classify_meshes(&meshes, &HEAD_REGION_KEYWORDS);
        assert_eq!(partition.head, vec![1, 2]);
        assert_eq!(partition.body, vec![0, 3]);
        assert_eq!(partition.len(), 4);
        assert_eq!(partition.region_of(2), Some(MeshRegion::Head));
        assert_eq!(partition.region_of(3), Some(MeshRegion::Body));
        assert_eq!(partition.region_of(4), None);
    }

    #[test]
    fn test_custom_keywords() {
        let keywords = vec!["Ear".to_string()];
        assert_eq!(classify_name("left_ear", &keywords), MeshRegion::Head);
        assert_eq!(classify_name("hair", &keywords), MeshRegion::Body);
    }

    #[test]
    fn test_draw_batches_body_first() {
        let partition = RegionPartition {
            head: vec![1],
            body: vec![0, 2],
        };
        let transforms = RigTransforms {
            head: Matrix4::new_scaling(2.0),
            body: Matrix4::identity(),
        };

        let batches: Vec<_> = partition.draw_batches(&transforms).collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].0, 0);
        assert_eq!(*batches[0].1, Matrix4::identity());
        assert_eq!(batches[2].0, 1);
        assert_eq!(*batches[2].1, Matrix4::new_scaling(2.0));
    }
}
