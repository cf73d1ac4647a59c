//! Path resolution against host-defined locations.
//!
//! The guest never sees the host's real directory layout until it asks;
//! every helper here is one round trip. Pure-string manipulation (`join`,
//! `dirname`, ...) also runs host-side so separators and normalization rules
//! match the machine the app is actually on.

use std::path::{Path, PathBuf};

use serde::Serialize;

use hostlink_core::command;

use crate::client::HostClient;
use crate::fs::BaseDirectory;
use crate::Result;

fn cmd(action: &str) -> String {
    command::plugin("path", action)
}

#[derive(Serialize)]
struct ResolveDirectoryArgs<'a> {
    directory: BaseDirectory,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a Path>,
}

#[derive(Serialize)]
struct PathsArgs {
    paths: Vec<PathBuf>,
}

#[derive(Serialize)]
struct PathArg<'a> {
    path: &'a Path,
}

/// Resolves `directory`, optionally joined with `path`, to an absolute path.
pub async fn resolve_directory(
    client: &HostClient,
    directory: BaseDirectory,
    path: Option<&Path>,
) -> Result<PathBuf> {
    client
        .call(&cmd("resolve_directory"), ResolveDirectoryArgs { directory, path })
        .await
}

pub async fn app_config_dir(client: &HostClient) -> Result<PathBuf> {
    resolve_directory(client, BaseDirectory::AppConfig, None).await
}

pub async fn app_data_dir(client: &HostClient) -> Result<PathBuf> {
    resolve_directory(client, BaseDirectory::AppData, None).await
}

pub async fn app_local_data_dir(client: &HostClient) -> Result<PathBuf> {
    resolve_directory(client, BaseDirectory::AppLocalData, None).await
}

pub async fn app_cache_dir(client: &HostClient) -> Result<PathBuf> {
    resolve_directory(client, BaseDirectory::AppCache, None).await
}

pub async fn app_log_dir(client: &HostClient) -> Result<PathBuf> {
    resolve_directory(client, BaseDirectory::AppLog, None).await
}

pub async fn config_dir(client: &HostClient) -> Result<PathBuf> {
    resolve_directory(client, BaseDirectory::Config, None).await
}

pub async fn data_dir(client: &HostClient) -> Result<PathBuf> {
    resolve_directory(client, BaseDirectory::Data, None).await
}

pub async fn cache_dir(client: &HostClient) -> Result<PathBuf> {
    resolve_directory(client, BaseDirectory::Cache, None).await
}

pub async fn home_dir(client: &HostClient) -> Result<PathBuf> {
    resolve_directory(client, BaseDirectory::Home, None).await
}

pub async fn desktop_dir(client: &HostClient) -> Result<PathBuf> {
    resolve_directory(client, BaseDirectory::Desktop, None).await
}

pub async fn document_dir(client: &HostClient) -> Result<PathBuf> {
    resolve_directory(client, BaseDirectory::Document, None).await
}

pub async fn download_dir(client: &HostClient) -> Result<PathBuf> {
    resolve_directory(client, BaseDirectory::Download, None).await
}

pub async fn temp_dir(client: &HostClient) -> Result<PathBuf> {
    resolve_directory(client, BaseDirectory::Temp, None).await
}

/// Joins path segments using the host's separator.
pub async fn join<I, P>(client: &HostClient, paths: I) -> Result<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    client.call(&cmd("join"), paths_args(paths)).await
}

/// Resolves segments into an absolute path, collapsing `..` and `.`.
pub async fn resolve<I, P>(client: &HostClient, paths: I) -> Result<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    client.call(&cmd("resolve"), paths_args(paths)).await
}

/// Normalizes a path, collapsing `..` and `.` without touching the cwd.
pub async fn normalize(client: &HostClient, path: impl AsRef<Path>) -> Result<PathBuf> {
    client
        .call(&cmd("normalize"), PathArg { path: path.as_ref() })
        .await
}

/// The directory portion of a path.
pub async fn dirname(client: &HostClient, path: impl AsRef<Path>) -> Result<PathBuf> {
    client
        .call(&cmd("dirname"), PathArg { path: path.as_ref() })
        .await
}

/// The final path component.
pub async fn basename(client: &HostClient, path: impl AsRef<Path>) -> Result<String> {
    client
        .call(&cmd("basename"), PathArg { path: path.as_ref() })
        .await
}

/// The extension of the final component, without the dot.
pub async fn extname(client: &HostClient, path: impl AsRef<Path>) -> Result<String> {
    client
        .call(&cmd("extname"), PathArg { path: path.as_ref() })
        .await
}

/// Whether the path is absolute under the host's rules.
pub async fn is_absolute(client: &HostClient, path: impl AsRef<Path>) -> Result<bool> {
    client
        .call(&cmd("is_absolute"), PathArg { path: path.as_ref() })
        .await
}

fn paths_args<I, P>(paths: I) -> PathsArgs
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    PathsArgs {
        paths: paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect(),
    }
}
