//! Shared geometry and materials
//!
//! Every block draws the same unit cube with one of four materials, so the
//! registry is built once per process and handed out by reference.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::vertex::Vertex;

/// Lighting model a material expects from the host renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shading {
    Standard,
    Phong,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: &'static str,
    /// sRGB, alpha 1
    pub color: [f32; 4],
    pub shading: Shading,
}

/// Material slots in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MaterialId {
    /// Start and End platforms
    FloorEndpoint,
    /// Platforms carrying an obstacle
    FloorObstacle,
    Obstacle,
    Wall,
}

impl MaterialId {
    fn index(self) -> usize {
        self as usize
    }
}

/// Unit cube centred on the origin, one quad per face
#[derive(Debug, Clone)]
pub struct BoxGeometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl BoxGeometry {
    pub fn unit() -> Self {
        // (normal, tangent u, tangent v) per face
        const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (n, u, v) in FACES {
            let base = vertices.len() as u16;
            for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
                let position = [
                    n[0] * 0.5 + u[0] * su + v[0] * sv,
                    n[1] * 0.5 + u[1] * su + v[1] * sv,
                    n[2] * 0.5 + u[2] * su + v[2] * sv,
                ];
                vertices.push(Vertex::new(position, n));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self { vertices, indices }
    }
}

/// Process-wide geometry/material set
#[derive(Debug)]
pub struct Registry {
    pub geometry: BoxGeometry,
    materials: [Material; 4],
}

impl Registry {
    /// The shared registry, built on first use
    pub fn get() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            log::debug!("Building geometry/material registry");
            Registry::build()
        })
    }

    fn build() -> Self {
        Self {
            geometry: BoxGeometry::unit(),
            materials: [
                Material {
                    name: "limegreen",
                    color: css_rgb(0x32, 0xcd, 0x32),
                    shading: Shading::Standard,
                },
                Material {
                    name: "greenyellow",
                    color: css_rgb(0xad, 0xff, 0x2f),
                    shading: Shading::Standard,
                },
                Material {
                    name: "orangered",
                    color: css_rgb(0xff, 0x45, 0x00),
                    shading: Shading::Phong,
                },
                Material {
                    name: "slategrey",
                    color: css_rgb(0x70, 0x80, 0x90),
                    shading: Shading::Standard,
                },
            ],
        }
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.index()]
    }
}

fn css_rgb(r: u8, g: u8, b: u8) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}
