use crate::ecosystem::Ecosystem;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    Manifest,
    Lockfile,
}

/// A discovered dependency manifest or lockfile. Immutable once created
/// during the walk phase (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub path: PathBuf,
    pub filename: String,
    pub ecosystem: Ecosystem,
    pub kind: ManifestKind,
    pub directory: PathBuf,
    pub confidence: f64,
}

/// A single declared or transitive dependency (§3). Uniqueness key is
/// `(ecosystem, name)`; a project may report several versions of the same
/// key across manifests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
    pub ecosystem: Ecosystem,
    pub transitive: bool,
    pub dev: bool,
    pub scope: Option<String>,
}

impl Dependency {
    pub fn key(&self) -> (Ecosystem, String) {
        (self.ecosystem, self.name.clone())
    }
}
