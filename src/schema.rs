//! Render inputs: the in-memory request the renderer consumes and the
//! serde-backed batch manifest the CLI reads from disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Group role of the quoted member; drives the badge palette and the
/// derived title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Admin,
    Owner,
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            other => bail!("unknown role '{other}' (expected member, admin or owner)"),
        }
    }
}

/// Immutable input to one frame render. The avatar is already-fetched
/// image bytes; the renderer performs no I/O beyond its resources dir.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub display_name: String,
    pub avatar: Vec<u8>,
    pub body_text: String,
    pub role: Role,
    pub title: Option<String>,
    pub level: u32,
}

/// One record of the CLI batch manifest: like `RenderRequest` but with
/// the avatar as a file path.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageSpec {
    pub name: String,
    pub avatar: PathBuf,
    pub text: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub level: u32,
}

impl MessageSpec {
    pub fn into_request(self) -> Result<RenderRequest> {
        let avatar = fs::read(&self.avatar)
            .with_context(|| format!("failed to read avatar '{}'", self.avatar.display()))?;
        Ok(RenderRequest {
            display_name: self.name,
            avatar,
            body_text: self.text,
            role: self.role,
            title: self.title,
            level: self.level,
        })
    }
}

/// Loads an ordered JSON array of message specs.
pub fn load_batch_manifest(path: &Path) -> Result<Vec<MessageSpec>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest '{}'", path.display()))?;
    let specs: Vec<MessageSpec> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid batch manifest '{}'", path.display()))?;
    if specs.is_empty() {
        bail!("batch manifest '{}' contains no messages", path.display());
    }
    Ok(specs)
}
