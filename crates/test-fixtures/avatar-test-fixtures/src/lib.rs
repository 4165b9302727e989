//! Shared fixture access for avatar runtime tests and benches.
//!
//! Every fixture is listed in `fixtures/manifest.json` under its kind
//! (`rigs`, `configs`) with a path relative to the `fixtures/` directory.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    rigs: BTreeMap<String, String>,
    #[serde(default)]
    configs: BTreeMap<String, String>,
}

static MANIFEST: Lazy<Result<Manifest, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../fixtures/manifest.json"))
        .map_err(|e| format!("fixtures/manifest.json is malformed: {e}"))
});

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    Rig,
    Config,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Rig => "rig",
            Kind::Config => "config",
        })
    }
}

fn manifest() -> Result<&'static Manifest> {
    match &*MANIFEST {
        Ok(m) => Ok(m),
        Err(msg) => bail!("{msg}"),
    }
}

fn entries(kind: Kind) -> Result<&'static BTreeMap<String, String>> {
    let m = manifest()?;
    Ok(match kind {
        Kind::Rig => &m.rigs,
        Kind::Config => &m.configs,
    })
}

/// Absolute path of the `fixtures/` directory.
pub fn root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

/// Sorted fixture names of one kind.
pub fn names(kind: Kind) -> Result<Vec<String>> {
    Ok(entries(kind)?.keys().cloned().collect())
}

pub fn path(kind: Kind, name: &str) -> Result<PathBuf> {
    let rel = entries(kind)?
        .get(name)
        .with_context(|| format!("no {kind} fixture named '{name}'"))?;
    Ok(root().join(rel))
}

pub fn read(kind: Kind, name: &str) -> Result<String> {
    let path = path(kind, name)?;
    fs::read_to_string(&path).with_context(|| format!("reading {kind} fixture {}", path.display()))
}

pub fn parse<T: DeserializeOwned>(kind: Kind, name: &str) -> Result<T> {
    let text = read(kind, name)?;
    serde_json::from_str(&text).with_context(|| format!("parsing {kind} fixture '{name}'"))
}

/// Avatar hierarchies in the shape an asset loader hands over.
pub mod rigs {
    use super::*;

    pub fn keys() -> Vec<String> {
        names(Kind::Rig).unwrap_or_default()
    }

    pub fn json(name: &str) -> Result<String> {
        read(Kind::Rig, name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        parse(Kind::Rig, name)
    }
}

/// Orchestrator configuration documents, full and partial.
pub mod configs {
    use super::*;

    pub fn keys() -> Vec<String> {
        names(Kind::Config).unwrap_or_default()
    }

    pub fn json(name: &str) -> Result<String> {
        read(Kind::Config, name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        parse(Kind::Config, name)
    }
}
