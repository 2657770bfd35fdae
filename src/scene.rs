//! Scene graph of a loaded avatar rig.
//!
//! Nodes live in a flat arena and refer to their children by index. The
//! child→parent map is computed once when the graph is built, and malformed
//! hierarchies (a node with two parents, out-of-range children, cycles) are
//! rejected at that point. The glTF/VRM front end reads only the node table
//! and the mesh primitive list; vertex data and textures stay with the
//! renderer.

use crate::{
    constants::{GLB_CHUNK_HEADER_LEN, GLB_CHUNK_TYPE_JSON, GLB_HEADER_LEN, GLB_MAGIC},
    Error, Result,
};
use log::{debug, info};
use nalgebra::{Matrix4, Vector3};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One node of the rig hierarchy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Local translation, when the node stores TRS components
    pub translation: Option<Vector3<f32>>,
    /// Full local matrix, when the node stores one instead
    pub matrix: Option<Matrix4<f32>>,
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
}

impl SceneNode {
    /// Node with a name and a local translation
    #[must_use]
    pub fn with_translation(name: impl Into<String>, translation: Vector3<f32>) -> Self {
        Self {
            name: name.into(),
            translation: Some(translation),
            ..Self::default()
        }
    }

    /// Add child indices
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = usize>) -> Self {
        self.children.extend(children);
        self
    }

    /// Local translation: the translation field if present, else the last
    /// column of the local matrix, else zero
    #[must_use]
    pub fn local_translation(&self) -> Vector3<f32> {
        if let Some(translation) = self.translation {
            return translation;
        }
        match &self.matrix {
            Some(m) => Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]),
            None => Vector3::zeros(),
        }
    }
}

/// Renderer-owned GPU handles of a mesh primitive, opaque to the rig code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshHandles {
    pub vertex_array: u32,
    pub vertex_buffer: u32,
    pub index_buffer: u32,
    pub texture: u32,
}

/// One drawable primitive
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshEntry {
    /// Name of the node instancing the mesh (may be empty)
    pub node_name: String,
    /// Name of the mesh definition
    pub mesh_name: String,
    pub node: usize,
    pub mesh: usize,
    pub primitive: usize,
    pub material: Option<usize>,
    pub handles: MeshHandles,
}

impl MeshEntry {
    /// Mesh entry identified only by name
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            node_name: name.into(),
            ..Self::default()
        }
    }

    /// Node name, falling back to the mesh definition name when empty
    #[must_use]
    pub fn name(&self) -> &str {
        if self.node_name.is_empty() {
            &self.mesh_name
        } else {
            &self.node_name
        }
    }
}

/// Immutable node arena plus mesh primitive list
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    meshes: Vec<MeshEntry>,
    parents: Vec<Option<usize>>,
}

impl SceneGraph {
    /// Build a graph and its parent map
    ///
    /// # Errors
    ///
    /// Returns `Error::SceneError` if a child index is out of range, a node
    /// is listed as the child of more than one node, or the hierarchy has a
    /// cycle.
    pub fn new(nodes: Vec<SceneNode>, meshes: Vec<MeshEntry>) -> Result<Self> {
        let parents = build_parent_map(&nodes)?;
        check_acyclic(&nodes, &parents)?;

        Ok(Self { nodes, meshes, parents })
    }

    #[must_use]
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    #[must_use]
    pub fn meshes(&self) -> &[MeshEntry] {
        &self.meshes
    }

    #[must_use]
    pub fn node(&self, index: usize) -> Option<&SceneNode> {
        self.nodes.get(index)
    }

    /// Parent of a node, `None` for roots
    #[must_use]
    pub fn parent(&self, index: usize) -> Option<usize> {
        self.parents.get(index).copied().flatten()
    }

    /// Index of the first node with exactly this name
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.name == name)
    }

    /// Ancestors of a node, nearest first
    pub fn ancestors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.parent(index), move |&current| self.parent(current))
    }

    /// Parse a glTF 2.0 / VRM JSON document
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid, a mesh primitive lacks
    /// `POSITION`, `NORMAL` or indices, or the hierarchy is malformed.
    pub fn from_gltf_json(text: &str) -> Result<Self> {
        let document: GltfDocument = serde_json::from_str(text)?;
        document.into_scene()
    }

    /// Parse a binary glTF (`.glb`/`.vrm`) container, reading its JSON chunk
    ///
    /// # Errors
    ///
    /// Returns an error if the container header or JSON chunk is malformed,
    /// or the embedded document is rejected by [`SceneGraph::from_gltf_json`].
    pub fn from_glb(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < GLB_HEADER_LEN + GLB_CHUNK_HEADER_LEN || &bytes[0..4] != GLB_MAGIC {
            return Err(Error::SceneError("Not a binary glTF container".to_string()));
        }

        let version = read_u32_le(bytes, 4)?;
        let declared_len = read_u32_le(bytes, 8)? as usize;
        if declared_len > bytes.len() {
            return Err(Error::SceneError(format!(
                "GLB declares {declared_len} bytes but only {} are present",
                bytes.len()
            )));
        }

        let chunk_len = read_u32_le(bytes, GLB_HEADER_LEN)? as usize;
        let chunk_type = read_u32_le(bytes, GLB_HEADER_LEN + 4)?;
        if chunk_type != GLB_CHUNK_TYPE_JSON {
            return Err(Error::SceneError(format!(
                "First GLB chunk has type {chunk_type:#010x}, expected JSON"
            )));
        }

        let start = GLB_HEADER_LEN + GLB_CHUNK_HEADER_LEN;
        let json = bytes
            .get(start..start + chunk_len)
            .ok_or_else(|| Error::SceneError("GLB JSON chunk is truncated".to_string()))?;
        let text = std::str::from_utf8(json)
            .map_err(|e| Error::SceneError(format!("GLB JSON chunk is not UTF-8: {e}")))?;

        debug!("GLB version {version}, JSON chunk {chunk_len} bytes");
        Self::from_gltf_json(text.trim_end_matches(['\0', ' ']))
    }
}

/// Load a scene file. `.vrm` and `.glb` files carrying the binary container
/// magic are read as binary; everything else is read as glTF JSON text.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its contents are rejected.
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneGraph> {
    let path = path.as_ref();
    info!("Loading scene: {}", path.display());

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let bytes = fs::read(path)?;
    let scene = if matches!(extension.as_str(), "vrm" | "glb") && bytes.starts_with(GLB_MAGIC) {
        SceneGraph::from_glb(&bytes)?
    } else {
        let text = String::from_utf8(bytes)
            .map_err(|e| Error::SceneError(format!("{} is neither GLB nor UTF-8 JSON: {e}", path.display())))?;
        SceneGraph::from_gltf_json(&text)?
    };

    info!(
        "Loaded {} nodes and {} mesh primitives",
        scene.nodes().len(),
        scene.meshes().len()
    );
    Ok(scene)
}

fn read_u32_le(bytes: &[u8], offset: usize) -> Result<u32> {
    bytes
        .get(offset..offset + 4)
        .and_then(|slice| slice.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| Error::SceneError(format!("Unexpected end of GLB data at offset {offset}")))
}

fn build_parent_map(nodes: &[SceneNode]) -> Result<Vec<Option<usize>>> {
    let mut parents = vec![None; nodes.len()];

    for (parent, node) in nodes.iter().enumerate() {
        for &child in &node.children {
            let slot = parents.get_mut(child).ok_or_else(|| {
                Error::SceneError(format!(
                    "Node {parent} ('{}') references missing child {child}",
                    node.name
                ))
            })?;
            if let Some(existing) = *slot {
                return Err(Error::SceneError(format!(
                    "Node {child} has two parents: {existing} and {parent}"
                )));
            }
            *slot = Some(parent);
        }
    }

    Ok(parents)
}

fn check_acyclic(nodes: &[SceneNode], parents: &[Option<usize>]) -> Result<()> {
    for start in 0..nodes.len() {
        let mut current = parents[start];
        let mut steps = 0;
        while let Some(parent) = current {
            steps += 1;
            if parent == start || steps > nodes.len() {
                return Err(Error::SceneError(format!(
                    "Node {start} ('{}') is part of a cycle",
                    nodes[start].name
                )));
            }
            current = parents[parent];
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct GltfDocument {
    #[serde(default)]
    nodes: Vec<GltfNode>,
    #[serde(default)]
    meshes: Vec<GltfMesh>,
}

#[derive(Debug, Deserialize)]
struct GltfNode {
    #[serde(default)]
    name: String,
    translation: Option<[f32; 3]>,
    matrix: Option<[f32; 16]>,
    #[serde(default)]
    children: Vec<usize>,
    mesh: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct GltfMesh {
    #[serde(default)]
    name: String,
    #[serde(default)]
    primitives: Vec<GltfPrimitive>,
}

#[derive(Debug, Deserialize)]
struct GltfPrimitive {
    #[serde(default)]
    attributes: BTreeMap<String, usize>,
    indices: Option<usize>,
    material: Option<usize>,
}

impl GltfDocument {
    fn into_scene(self) -> Result<SceneGraph> {
        let mut meshes = Vec::new();

        for (node_index, node) in self.nodes.iter().enumerate() {
            let Some(mesh_index) = node.mesh else { continue };
            let mesh = self.meshes.get(mesh_index).ok_or_else(|| {
                Error::SceneError(format!("Node '{}' references missing mesh {mesh_index}", node.name))
            })?;

            for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
                for attribute in ["POSITION", "NORMAL"] {
                    if !primitive.attributes.contains_key(attribute) {
                        return Err(Error::SceneError(format!(
                            "Mesh '{}' primitive {primitive_index} is missing {attribute}",
                            mesh.name
                        )));
                    }
                }
                if primitive.indices.is_none() {
                    return Err(Error::SceneError(format!(
                        "Mesh '{}' primitive {primitive_index} has no indices",
                        mesh.name
                    )));
                }

                meshes.push(MeshEntry {
                    node_name: node.name.clone(),
                    mesh_name: mesh.name.clone(),
                    node: node_index,
                    mesh: mesh_index,
                    primitive: primitive_index,
                    material: primitive.material,
                    handles: MeshHandles::default(),
                });
            }
        }

        let nodes = self
            .nodes
            .into_iter()
            .map(|node| SceneNode {
                name: node.name,
                translation: node.translation.map(Vector3::from),
                matrix: node.matrix.map(|m| Matrix4::from_column_slice(&m)),
                children: node.children,
                mesh: node.mesh,
            })
            .collect();

        SceneGraph::new(nodes, meshes)
    }
}
