//! File system access routed through the host.
//!
//! Paths are relative to one of the [`BaseDirectory`] roots unless the host
//! was configured to accept absolute ones; which roots and patterns are
//! reachable is enforced host-side, so a denied path surfaces as a host
//! rejection, never as a local error.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use hostlink_core::command;

use crate::client::HostClient;
use crate::Result;

fn cmd(action: &str) -> String {
    command::plugin("fs", action)
}

/// Well-known directories paths can be resolved against.
///
/// Travels as its numeric discriminant, which is part of the wire contract;
/// the values are stable and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum BaseDirectory {
    Audio = 1,
    Cache = 2,
    Config = 3,
    Data = 4,
    LocalData = 5,
    Document = 6,
    Download = 7,
    Picture = 8,
    Public = 9,
    Video = 10,
    Resource = 11,
    Temp = 12,
    AppConfig = 13,
    AppData = 14,
    AppLocalData = 15,
    AppCache = 16,
    AppLog = 17,
    Desktop = 18,
    Executable = 19,
    Font = 20,
    Home = 21,
    Runtime = 22,
    Template = 23,
}

impl BaseDirectory {
    fn from_wire(raw: u16) -> Option<Self> {
        Some(match raw {
            1 => BaseDirectory::Audio,
            2 => BaseDirectory::Cache,
            3 => BaseDirectory::Config,
            4 => BaseDirectory::Data,
            5 => BaseDirectory::LocalData,
            6 => BaseDirectory::Document,
            7 => BaseDirectory::Download,
            8 => BaseDirectory::Picture,
            9 => BaseDirectory::Public,
            10 => BaseDirectory::Video,
            11 => BaseDirectory::Resource,
            12 => BaseDirectory::Temp,
            13 => BaseDirectory::AppConfig,
            14 => BaseDirectory::AppData,
            15 => BaseDirectory::AppLocalData,
            16 => BaseDirectory::AppCache,
            17 => BaseDirectory::AppLog,
            18 => BaseDirectory::Desktop,
            19 => BaseDirectory::Executable,
            20 => BaseDirectory::Font,
            21 => BaseDirectory::Home,
            22 => BaseDirectory::Runtime,
            23 => BaseDirectory::Template,
            _ => return None,
        })
    }
}

impl Serialize for BaseDirectory {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u16(*self as u16)
    }
}

impl<'de> Deserialize<'de> for BaseDirectory {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u16::deserialize(deserializer)?;
        BaseDirectory::from_wire(raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown base directory {raw}")))
    }
}

/// Options accepted by single-path operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FsOptions {
    /// Root the path is resolved against; host default when absent.
    #[serde(rename = "dir", skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<BaseDirectory>,
}

impl FsOptions {
    pub fn in_dir(dir: BaseDirectory) -> Self {
        FsOptions {
            base_dir: Some(dir),
        }
    }
}

/// Options for operations that walk or build directory trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DirOptions {
    #[serde(rename = "dir", skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<BaseDirectory>,
    /// Whether to recurse into (or create) intermediate directories.
    pub recursive: bool,
}

/// Options for [`rename`], whose two paths may live under different roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_path_base_dir: Option<BaseDirectory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_path_base_dir: Option<BaseDirectory>,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: Option<String>,
    /// Present for recursive listings of subdirectories.
    #[serde(default)]
    pub children: Option<Vec<DirEntry>>,
}

/// Metadata for one path, timestamps in milliseconds since the epoch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    #[serde(rename = "accessedAtMs")]
    pub accessed_at: i64,
    #[serde(rename = "createdAtMs")]
    pub created_at: i64,
    #[serde(rename = "modifiedAtMs")]
    pub modified_at: i64,
    pub is_dir: bool,
    pub is_file: bool,
    pub is_symlink: bool,
    pub size: u64,
    pub permissions: FilePermissions,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilePermissions {
    pub readonly: bool,
    /// Raw `st_mode` bits; only reported on Unix hosts.
    pub mode: Option<u32>,
}

#[derive(Serialize)]
struct PathArgs<'a> {
    path: &'a Path,
    options: FsOptions,
}

#[derive(Serialize)]
struct DirArgs<'a> {
    path: &'a Path,
    options: DirOptions,
}

#[derive(Serialize)]
struct WriteTextArgs<'a> {
    path: &'a Path,
    contents: &'a str,
    options: FsOptions,
}

#[derive(Serialize)]
struct WriteBinaryArgs<'a> {
    path: &'a Path,
    contents: &'a [u8],
    options: FsOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenameArgs<'a> {
    old_path: &'a Path,
    new_path: &'a Path,
    options: RenameOptions,
}

#[derive(Serialize)]
struct CopyArgs<'a> {
    source: &'a Path,
    destination: &'a Path,
    options: FsOptions,
}

async fn with_path<T: DeserializeOwned>(
    client: &HostClient,
    action: &str,
    path: &Path,
    options: FsOptions,
) -> Result<T> {
    client.call(&cmd(action), PathArgs { path, options }).await
}

/// Reads a file as UTF-8 text.
pub async fn read_text_file(
    client: &HostClient,
    path: impl AsRef<Path>,
    options: FsOptions,
) -> Result<String> {
    with_path(client, "read_text_file", path.as_ref(), options).await
}

/// Reads a file as raw bytes.
pub async fn read_file(
    client: &HostClient,
    path: impl AsRef<Path>,
    options: FsOptions,
) -> Result<Vec<u8>> {
    with_path(client, "read_file", path.as_ref(), options).await
}

/// Writes UTF-8 text, replacing the file if it exists.
pub async fn write_text_file(
    client: &HostClient,
    path: impl AsRef<Path>,
    contents: &str,
    options: FsOptions,
) -> Result<()> {
    client
        .call(
            &cmd("write_text_file"),
            WriteTextArgs {
                path: path.as_ref(),
                contents,
                options,
            },
        )
        .await
}

/// Writes raw bytes, replacing the file if it exists.
pub async fn write_file(
    client: &HostClient,
    path: impl AsRef<Path>,
    contents: &[u8],
    options: FsOptions,
) -> Result<()> {
    client
        .call(
            &cmd("write_file"),
            WriteBinaryArgs {
                path: path.as_ref(),
                contents,
                options,
            },
        )
        .await
}

/// Whether a path exists.
pub async fn exists(
    client: &HostClient,
    path: impl AsRef<Path>,
    options: FsOptions,
) -> Result<bool> {
    with_path(client, "exists", path.as_ref(), options).await
}

/// Removes a file or directory; directories need `recursive` to go down
/// non-empty.
pub async fn remove(
    client: &HostClient,
    path: impl AsRef<Path>,
    options: DirOptions,
) -> Result<()> {
    client
        .call(
            &cmd("remove"),
            DirArgs {
                path: path.as_ref(),
                options,
            },
        )
        .await
}

/// Renames (moves) a path.
pub async fn rename(
    client: &HostClient,
    old_path: impl AsRef<Path>,
    new_path: impl AsRef<Path>,
    options: RenameOptions,
) -> Result<()> {
    client
        .call(
            &cmd("rename"),
            RenameArgs {
                old_path: old_path.as_ref(),
                new_path: new_path.as_ref(),
                options,
            },
        )
        .await
}

/// Copies a file to a new destination.
pub async fn copy_file(
    client: &HostClient,
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    options: FsOptions,
) -> Result<()> {
    client
        .call(
            &cmd("copy_file"),
            CopyArgs {
                source: source.as_ref(),
                destination: destination.as_ref(),
                options,
            },
        )
        .await
}

/// Creates a directory; with `recursive` also its missing parents.
pub async fn mkdir(client: &HostClient, path: impl AsRef<Path>, options: DirOptions) -> Result<()> {
    client
        .call(
            &cmd("mkdir"),
            DirArgs {
                path: path.as_ref(),
                options,
            },
        )
        .await
}

/// Lists a directory; with `recursive` the entries carry their children.
pub async fn read_dir(
    client: &HostClient,
    path: impl AsRef<Path>,
    options: DirOptions,
) -> Result<Vec<DirEntry>> {
    client
        .call(
            &cmd("read_dir"),
            DirArgs {
                path: path.as_ref(),
                options,
            },
        )
        .await
}

/// Metadata for a path, following symlinks.
pub async fn stat(
    client: &HostClient,
    path: impl AsRef<Path>,
    options: FsOptions,
) -> Result<FileInfo> {
    with_path(client, "stat", path.as_ref(), options).await
}
