//! Native dialog boxes: file pickers and message prompts.
//!
//! Paths picked by the user come back verbatim; whether picking widens any
//! host-side access scope is the host's policy, not something expressed
//! here.

use std::path::PathBuf;

use serde::Serialize;

use hostlink_core::command;

use crate::client::HostClient;
use crate::Result;

fn cmd(action: &str) -> String {
    command::plugin("dialog", action)
}

/// Extension filter for the file pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogFilter {
    /// Name the picker displays for this filter.
    pub name: String,
    /// Extensions to allow, without the leading dot.
    pub extensions: Vec<String>,
}

/// Options for [`open`] and [`open_multiple`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenDialogOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Directory or file the picker starts at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_path: Option<PathBuf>,
    /// Pick directories instead of files.
    pub directory: bool,
    /// Allow selecting more than one entry.
    pub multiple: bool,
    /// For directory picks, whether subdirectories count as in scope.
    pub recursive: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<DialogFilter>,
}

/// Options for [`save`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDialogOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Starting directory, or a suggested file name when it does not exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<DialogFilter>,
}

/// Severity a message dialog is decorated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageDialogKind {
    #[default]
    Info,
    Warning,
    Error,
}

/// Options for [`message`], [`ask`] and [`confirm`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MessageDialogOptions {
    /// Dialog title; the host falls back to the app name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub kind: MessageDialogKind,
}

#[derive(Serialize)]
struct Wrapped<T> {
    options: T,
}

#[derive(Serialize)]
struct MessageArgs<'a> {
    message: &'a str,
    options: MessageDialogOptions,
}

/// Single-selection file or directory picker.
///
/// `None` means the user cancelled.
pub async fn open(client: &HostClient, options: OpenDialogOptions) -> Result<Option<PathBuf>> {
    client.call(&cmd("open"), Wrapped { options }).await
}

/// Multi-selection picker; set `multiple` in the options.
pub async fn open_multiple(
    client: &HostClient,
    options: OpenDialogOptions,
) -> Result<Option<Vec<PathBuf>>> {
    client.call(&cmd("open_multiple"), Wrapped { options }).await
}

/// Save-file picker. `None` means the user cancelled.
pub async fn save(client: &HostClient, options: SaveDialogOptions) -> Result<Option<PathBuf>> {
    client.call(&cmd("save"), Wrapped { options }).await
}

/// Message dialog with a single `Ok` button.
pub async fn message(
    client: &HostClient,
    message: &str,
    options: MessageDialogOptions,
) -> Result<()> {
    client.call(&cmd("message"), MessageArgs { message, options }).await
}

/// Question dialog with `Yes` and `No`; `true` for `Yes`.
pub async fn ask(client: &HostClient, message: &str, options: MessageDialogOptions) -> Result<bool> {
    client.call(&cmd("ask"), MessageArgs { message, options }).await
}

/// Question dialog with `Ok` and `Cancel`; `true` for `Ok`.
pub async fn confirm(
    client: &HostClient,
    message: &str,
    options: MessageDialogOptions,
) -> Result<bool> {
    client.call(&cmd("confirm"), MessageArgs { message, options }).await
}
