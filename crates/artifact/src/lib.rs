//! Compiled contract artifacts.
//!
//! Reads the JSON the Solidity toolchain writes next to a project: Hardhat's
//! `artifacts/` tree (`bytecode` is a hex string) and Foundry's `out/` tree
//! (`bytecode.object`). Build-info files are located through Hardhat's
//! `<Name>.dbg.json` companions.

use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::Bytes;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("No artifact named `{0}` found")]
    NotFound(String),

    #[error("Artifact name `{name}` is ambiguous, use a fully qualified name: {candidates}")]
    Ambiguous { name: String, candidates: String },

    #[error("Invalid bytecode in {0}")]
    InvalidBytecode(PathBuf),

    #[error("Bytecode in {0} has unlinked library references")]
    UnlinkedLibraries(PathBuf),

    #[error("No build info recorded for {0}")]
    MissingBuildInfo(PathBuf),
}

/// A compiled contract: its ABI and creation bytecode.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub contract_name: String,
    /// Source file, when the artifact records it
    pub source_name: Option<String>,
    pub abi: JsonAbi,
    /// Creation bytecode, empty for interfaces and abstract contracts
    pub bytecode: Bytes,
    /// File the artifact was read from
    pub path: PathBuf,
}

impl Artifact {
    /// Parse an artifact file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let contents = read(path)?;
        Self::from_json(&contents, path)
    }

    /// Parse artifact JSON; `path` is used for error messages and naming.
    pub fn from_json(contents: &str, path: &Path) -> Result<Self, ArtifactError> {
        let raw: RawArtifact = serde_json::from_str(contents).map_err(|source| {
            ArtifactError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let hex = raw.bytecode.as_hex();
        if hex.contains("__$") {
            return Err(ArtifactError::UnlinkedLibraries(path.to_path_buf()));
        }
        let bytecode: Bytes = hex
            .parse()
            .map_err(|_| ArtifactError::InvalidBytecode(path.to_path_buf()))?;

        let contract_name = raw.contract_name.unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        Ok(Self {
            contract_name,
            source_name: raw.source_name,
            abi: raw.abi,
            bytecode,
            path: path.to_path_buf(),
        })
    }

    /// Whether the artifact has creation code.
    pub fn is_deployable(&self) -> bool {
        !self.bytecode.is_empty()
    }

    /// The `initialize` overload taking `arity` arguments.
    pub fn initializer(&self, arity: usize) -> Option<&Function> {
        self.abi
            .function("initialize")?
            .iter()
            .find(|f| f.inputs.len() == arity)
    }

    /// Whether the ABI declares any `initialize` overload.
    pub fn has_initializer(&self) -> bool {
        self.abi.function("initialize").is_some_and(|f| !f.is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: Option<String>,
    source_name: Option<String>,
    abi: JsonAbi,
    bytecode: RawBytecode,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// Hardhat
    Hex(String),
    /// Foundry
    Object { object: String },
}

impl RawBytecode {
    fn as_hex(&self) -> &str {
        match self {
            Self::Hex(hex) => hex,
            Self::Object { object } => object,
        }
    }
}

/// Compiler input and version recorded for a compilation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub solc_version: String,
    /// e.g. `0.8.18+commit.87f61d96`
    pub solc_long_version: String,
    /// Standard JSON input
    pub input: Value,
}

impl BuildInfo {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let contents = read(path)?;
        serde_json::from_str(&contents).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugFile {
    build_info: String,
}

/// A directory of compiled artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find and load an artifact by contract name.
    ///
    /// `name` is either a bare contract name (`Token`) or fully qualified
    /// (`contracts/Token.sol:Token`). A bare name that exists in several
    /// source files is an error.
    pub fn load(&self, name: &str) -> Result<Artifact, ArtifactError> {
        let path = self.find(name)?;
        debug!(name, path = %path.display(), "Loading artifact");
        Artifact::from_file(path)
    }

    /// Locate the artifact file for `name`.
    pub fn find(&self, name: &str) -> Result<PathBuf, ArtifactError> {
        let (source, contract) = match name.rsplit_once(':') {
            Some((source, contract)) => (Some(source), contract),
            None => (None, name),
        };
        let file_name = format!("{contract}.json");

        let mut candidates: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.file_name().to_string_lossy() == file_name)
            .map(walkdir::DirEntry::into_path)
            .filter(|path| !path.components().any(|c| c.as_os_str() == "build-info"))
            .filter(|path| match source {
                Some(source) => path.parent().is_some_and(|dir| {
                    dir.ends_with(source) || dir.file_name() == Path::new(source).file_name()
                }),
                None => true,
            })
            .collect();

        candidates.sort();

        match candidates.len() {
            0 => Err(ArtifactError::NotFound(name.to_string())),
            1 => Ok(candidates.remove(0)),
            _ => Err(ArtifactError::Ambiguous {
                name: name.to_string(),
                candidates: candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Load the build info for an artifact via its `.dbg.json` companion.
    pub fn build_info(&self, artifact: &Artifact) -> Result<BuildInfo, ArtifactError> {
        let missing = || ArtifactError::MissingBuildInfo(artifact.path.clone());
        let dbg_path = artifact.path.with_extension("dbg.json");
        if !dbg_path.is_file() {
            return Err(missing());
        }

        let contents = read(&dbg_path)?;
        let dbg: DebugFile =
            serde_json::from_str(&contents).map_err(|source| ArtifactError::Parse {
                path: dbg_path.clone(),
                source,
            })?;

        let dir = dbg_path.parent().ok_or_else(missing)?;
        BuildInfo::from_file(dir.join(dbg.build_info))
    }
}

fn read(path: &Path) -> Result<String, ArtifactError> {
    std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Selector;
    use std::fs;
    use tempfile::TempDir;

    const ABI: &str = r#"[
        {"type":"constructor","inputs":[{"name":"greeting","type":"string","internalType":"string"}],"stateMutability":"nonpayable"},
        {"type":"function","name":"initialize","inputs":[],"outputs":[],"stateMutability":"nonpayable"},
        {"type":"function","name":"greet","inputs":[],"outputs":[{"name":"","type":"string","internalType":"string"}],"stateMutability":"view"}
    ]"#;

    fn hardhat_artifact(name: &str, bytecode: &str) -> String {
        format!(
            r#"{{"_format":"hh-sol-artifact-1","contractName":"{name}","sourceName":"contracts/{name}.sol","abi":{ABI},"bytecode":"{bytecode}","deployedBytecode":"0x","linkReferences":{{}},"deployedLinkReferences":{{}}}}"#
        )
    }

    fn write(root: &Path, relative: &str, contents: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_hardhat_artifact() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "contracts/HelloWorld.sol/HelloWorld.json",
            &hardhat_artifact("HelloWorld", "0x6080604052"),
        );
        write(
            dir.path(),
            "contracts/HelloWorld.sol/HelloWorld.dbg.json",
            r#"{"_format":"hh-sol-dbg-1","buildInfo":"../../build-info/abc.json"}"#,
        );

        let store = ArtifactStore::new(dir.path());
        let artifact = store.load("HelloWorld").unwrap();

        assert_eq!(artifact.contract_name, "HelloWorld");
        assert_eq!(artifact.source_name.as_deref(), Some("contracts/HelloWorld.sol"));
        assert_eq!(artifact.bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
        assert!(artifact.is_deployable());
        assert!(artifact.has_initializer());
        assert_eq!(
            artifact.initializer(0).map(Function::selector),
            Some(Selector::from([0x81, 0x29, 0xfc, 0x1c]))
        );
        assert!(artifact.initializer(1).is_none());
        assert!(artifact.abi.constructor.is_some());
    }

    #[test]
    fn test_foundry_artifact() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "Counter.sol/Counter.json",
            r#"{"abi":[],"bytecode":{"object":"0x6001","linkReferences":{}},"deployedBytecode":{"object":"0x"}}"#,
        );

        let artifact = ArtifactStore::new(dir.path()).load("Counter").unwrap();
        assert_eq!(artifact.contract_name, "Counter");
        assert_eq!(artifact.source_name, None);
        assert_eq!(artifact.bytecode.len(), 2);
        assert!(!artifact.has_initializer());
    }

    #[test]
    fn test_interface_is_not_deployable() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "contracts/IThing.sol/IThing.json",
            &hardhat_artifact("IThing", "0x"),
        );

        let artifact = ArtifactStore::new(dir.path()).load("IThing").unwrap();
        assert!(!artifact.is_deployable());
    }

    #[test]
    fn test_unlinked_library() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "contracts/Lib.sol/UsesLib.json",
            &hardhat_artifact("UsesLib", "0x73__$abcdef$__6001"),
        );

        let err = ArtifactStore::new(dir.path()).load("UsesLib").unwrap_err();
        assert!(matches!(err, ArtifactError::UnlinkedLibraries(_)));
    }

    #[test]
    fn test_ambiguous_and_qualified_names() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "contracts/A.sol/Token.json",
            &hardhat_artifact("Token", "0x01"),
        );
        write(
            dir.path(),
            "contracts/B.sol/Token.json",
            &hardhat_artifact("Token", "0x02"),
        );
        let store = ArtifactStore::new(dir.path());

        assert!(matches!(
            store.load("Token"),
            Err(ArtifactError::Ambiguous { .. })
        ));

        let artifact = store.load("contracts/B.sol:Token").unwrap();
        assert_eq!(artifact.bytecode.as_ref(), &[0x02]);
    }

    #[test]
    fn test_missing_artifact_and_debug_files_ignored() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "contracts/Thing.sol/Thing.dbg.json",
            r#"{"buildInfo":"../../build-info/x.json"}"#,
        );
        write(
            dir.path(),
            "build-info/Thing.json",
            r#"{"solcVersion":"0.8.18"}"#,
        );

        let err = ArtifactStore::new(dir.path()).load("Thing").unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound(_)));
    }

    #[test]
    fn test_build_info_through_debug_file() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "contracts/HelloWorld.sol/HelloWorld.json",
            &hardhat_artifact("HelloWorld", "0x6001"),
        );
        write(
            dir.path(),
            "contracts/HelloWorld.sol/HelloWorld.dbg.json",
            r#"{"_format":"hh-sol-dbg-1","buildInfo":"../../build-info/abc.json"}"#,
        );
        write(
            dir.path(),
            "build-info/abc.json",
            r#"{"id":"abc","solcVersion":"0.8.18","solcLongVersion":"0.8.18+commit.87f61d96","input":{"language":"Solidity","sources":{}}}"#,
        );

        let store = ArtifactStore::new(dir.path());
        let artifact = store.load("HelloWorld").unwrap();
        let info = store.build_info(&artifact).unwrap();

        assert_eq!(info.solc_version, "0.8.18");
        assert_eq!(info.solc_long_version, "0.8.18+commit.87f61d96");
        assert_eq!(info.input["language"], "Solidity");
    }

    #[test]
    fn test_missing_build_info() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "Counter.sol/Counter.json",
            r#"{"abi":[],"bytecode":{"object":"0x6001"}}"#,
        );

        let store = ArtifactStore::new(dir.path());
        let artifact = Artifact::from_file(path).unwrap();
        assert!(matches!(
            store.build_info(&artifact),
            Err(ArtifactError::MissingBuildInfo(_))
        ));
    }
}
